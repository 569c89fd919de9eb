//! Shared paging logic for the transaction and category listings.

/// Paging defaults applied when a request leaves them unspecified.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number used when a request does not name one.
    pub default_page: u64,
    /// How many rows each page holds when a request does not say.
    pub default_page_size: u64,
    /// The widest run of numbered page links the pager renders.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

/// One element of the pager rendered under a listing.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to the given page.
    Page(u64),
    /// The page currently shown, rendered without a link.
    CurrPage(u64),
    /// A gap between the window and the first or last page.
    Ellipsis,
    /// The forward arrow, holding the page it navigates to.
    NextButton(u64),
    /// The backward arrow, holding the page it navigates to.
    BackButton(u64),
}

/// Lay out the pager for a listing with `page_count` pages.
///
/// At most `max_pages` consecutive page numbers are shown, centred on the
/// current page where possible. When the window does not touch an end of the
/// range, the first or last page is appended behind an ellipsis. Back and
/// next arrows appear whenever there is a page on that side.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let half_window = max_pages / 2;

    let (window_start, window_end) = if page_count <= max_pages {
        (1, page_count)
    } else if curr_page <= half_window {
        (1, max_pages)
    } else if curr_page > page_count - half_window {
        (page_count - max_pages + 1, page_count)
    } else {
        (curr_page - half_window, curr_page + half_window)
    };

    let mut indicators = Vec::new();

    if curr_page > 1 {
        indicators.push(PaginationIndicator::BackButton(curr_page - 1));
    }

    if window_start > 1 {
        indicators.push(PaginationIndicator::Page(1));
        indicators.push(PaginationIndicator::Ellipsis);
    }

    for page in window_start..=window_end {
        indicators.push(if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        });
    }

    if window_end < page_count {
        indicators.push(PaginationIndicator::Ellipsis);
        indicators.push(PaginationIndicator::Page(page_count));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

#[cfg(test)]
mod pagination_tests {
    use crate::pagination::{PaginationIndicator, create_pagination_indicators};

    #[test]
    fn few_pages_are_all_listed() {
        let indicators = create_pagination_indicators(1, 5, 5);

        assert_eq!(
            indicators,
            [
                PaginationIndicator::CurrPage(1),
                PaginationIndicator::Page(2),
                PaginationIndicator::Page(3),
                PaginationIndicator::Page(4),
                PaginationIndicator::Page(5),
                PaginationIndicator::NextButton(2),
            ]
        );
    }

    #[test]
    fn first_page_pins_the_window_to_the_left() {
        let indicators = create_pagination_indicators(1, 10, 5);

        assert_eq!(
            indicators,
            [
                PaginationIndicator::CurrPage(1),
                PaginationIndicator::Page(2),
                PaginationIndicator::Page(3),
                PaginationIndicator::Page(4),
                PaginationIndicator::Page(5),
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(10),
                PaginationIndicator::NextButton(2),
            ]
        );
    }

    #[test]
    fn window_touching_the_left_edge_keeps_the_first_page_inline() {
        let indicators = create_pagination_indicators(3, 10, 5);

        assert_eq!(
            indicators,
            [
                PaginationIndicator::BackButton(2),
                PaginationIndicator::Page(1),
                PaginationIndicator::Page(2),
                PaginationIndicator::CurrPage(3),
                PaginationIndicator::Page(4),
                PaginationIndicator::Page(5),
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(10),
                PaginationIndicator::NextButton(4),
            ]
        );
    }

    #[test]
    fn last_page_pins_the_window_to_the_right() {
        let indicators = create_pagination_indicators(10, 10, 5);

        assert_eq!(
            indicators,
            [
                PaginationIndicator::BackButton(9),
                PaginationIndicator::Page(1),
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(6),
                PaginationIndicator::Page(7),
                PaginationIndicator::Page(8),
                PaginationIndicator::Page(9),
                PaginationIndicator::CurrPage(10),
            ]
        );
    }

    #[test]
    fn window_near_the_right_edge_keeps_the_last_page_inline() {
        let indicators = create_pagination_indicators(8, 10, 5);

        assert_eq!(
            indicators,
            [
                PaginationIndicator::BackButton(7),
                PaginationIndicator::Page(1),
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(6),
                PaginationIndicator::Page(7),
                PaginationIndicator::CurrPage(8),
                PaginationIndicator::Page(9),
                PaginationIndicator::Page(10),
                PaginationIndicator::NextButton(9),
            ]
        );
    }

    #[test]
    fn middle_page_gets_an_ellipsis_on_each_side() {
        let indicators = create_pagination_indicators(5, 10, 5);

        assert_eq!(
            indicators,
            [
                PaginationIndicator::BackButton(4),
                PaginationIndicator::Page(1),
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(3),
                PaginationIndicator::Page(4),
                PaginationIndicator::CurrPage(5),
                PaginationIndicator::Page(6),
                PaginationIndicator::Page(7),
                PaginationIndicator::Ellipsis,
                PaginationIndicator::Page(10),
                PaginationIndicator::NextButton(6),
            ]
        );
    }

    #[test]
    fn single_page_listing_has_no_navigation() {
        let indicators = create_pagination_indicators(1, 1, 5);

        assert_eq!(indicators, [PaginationIndicator::CurrPage(1)]);
    }
}
