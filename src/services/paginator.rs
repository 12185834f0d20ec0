use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Reads a `?page=` value. Anything that is not a positive integer means the first page.
/// Integers too large for `usize` saturate, so they still land on the last page.
pub fn parse_page_number(raw: Option<&str>) -> usize {
	let Some(raw) = raw.map(str::trim) else {
		return 1;
	};
	let digits = raw.strip_prefix('+').unwrap_or(raw);
	if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
		return 1;
	}
	match digits.parse::<usize>() {
		Ok(0) => 1,
		Ok(number) => number,
		// all digits, so the only failure left is overflow
		Err(_) => usize::MAX,
	}
}

/// Where a page sits inside a sequence of `count` items.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PageWindow {
	pub number: usize,
	pub total_pages: usize,
	pub count: usize,
	pub offset: usize,
	pub limit: usize,
}

impl PageWindow {
	pub fn has_next(&self) -> bool {
		self.number < self.total_pages
	}
	pub fn has_previous(&self) -> bool {
		self.number > 1
	}
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct Page<T> {
	pub items: Vec<T>,
	pub number: usize,
	pub total_pages: usize,
	pub count: usize,
	pub has_next: bool,
	pub has_previous: bool,
}

impl<T> Page<T> {
	pub fn new(
		items: Vec<T>,
		window: PageWindow,
	) -> Self {
		Self {
			items,
			number: window.number,
			total_pages: window.total_pages,
			count: window.count,
			has_next: window.has_next(),
			has_previous: window.has_previous(),
		}
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

/// Fixed-size page slicing. Out of range requests land on the last page.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Paginator {
	per_page: usize,
}

impl Default for Paginator {
	fn default() -> Self {
		Self::new(DEFAULT_PAGE_SIZE)
	}
}

impl Paginator {
	pub fn new(per_page: usize) -> Self {
		Self { per_page: per_page.max(1) }
	}

	pub fn per_page(&self) -> usize {
		self.per_page
	}

	/// An empty sequence still has one (empty) page.
	pub fn total_pages(
		&self,
		count: usize,
	) -> usize {
		count.div_ceil(self.per_page).max(1)
	}

	pub fn window(
		&self,
		count: usize,
		requested: usize,
	) -> PageWindow {
		let total_pages = self.total_pages(count);
		let number = requested.clamp(1, total_pages);
		let offset = (number - 1) * self.per_page;
		PageWindow {
			number,
			total_pages,
			count,
			offset,
			limit: self.per_page.min(count.saturating_sub(offset)),
		}
	}

	pub fn paginate<T: Clone>(
		&self,
		items: &[T],
		raw_number: Option<&str>,
	) -> Page<T> {
		let window = self.window(items.len(), parse_page_number(raw_number));
		Page::new(items[window.offset..window.offset + window.limit].to_vec(), window)
	}
}
