// selection criteria for post feeds

/// What a request asks to see.
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub enum Scope {
	All,
	Group(String),
	Author(String),
	Followed,
}

/// A scope after its slug, username or viewer has been resolved against the store.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PostFilter {
	All,
	Group(i64),
	Author(i64),
	FollowedBy(i64),
}
