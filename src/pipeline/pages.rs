//! Page-selection expressions: `first`, `all`, `1,3-5` → a concrete page set.
//!
//! Resolution is all-or-nothing. A single bad token fails the whole
//! expression so a typo like `1-100` on a 10-page file never silently
//! converts the wrong pages.

use crate::error::PageRangeError;
use std::collections::BTreeSet;

/// Resolve a page-selection expression against a document's page count.
///
/// * empty or `first` (any case) → `[1]`, or `[]` for a zero-page count
/// * `all` (any case) → `[1, …, total_pages]`
/// * otherwise comma-separated tokens: single integers or `start-end`
///   ranges, whitespace tolerated around tokens and the hyphen
///
/// Duplicates collapse; the result is strictly ascending with every page
/// in `[1, total_pages]`.
pub fn resolve_pages(expression: &str, total_pages: u32) -> Result<Vec<u32>, PageRangeError> {
    let expr = expression.trim();

    if expr.is_empty() || expr.eq_ignore_ascii_case("first") {
        return Ok(if total_pages > 0 { vec![1] } else { Vec::new() });
    }
    if expr.eq_ignore_ascii_case("all") {
        return Ok((1..=total_pages).collect());
    }

    let mut pages = BTreeSet::new();
    for token in expr.split(',') {
        let token = token.trim();
        match token.split_once('-') {
            Some((start, end)) => {
                let start = parse_page(start, token)?;
                let end = parse_page(end, token)?;
                check_bounds(start, total_pages)?;
                check_bounds(end, total_pages)?;
                if start > end {
                    return Err(PageRangeError::BackwardsRange { start, end });
                }
                pages.extend(start..=end);
            }
            None => {
                let page = parse_page(token, token)?;
                check_bounds(page, total_pages)?;
                pages.insert(page);
            }
        }
    }

    Ok(pages.into_iter().collect())
}

fn parse_page(text: &str, token: &str) -> Result<u32, PageRangeError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| PageRangeError::InvalidToken {
            token: token.to_string(),
        })
}

fn check_bounds(page: u32, total_pages: u32) -> Result<(), PageRangeError> {
    if page == 0 || page > total_pages {
        return Err(PageRangeError::OutOfRange {
            page,
            total: total_pages,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_is_page_one() {
        assert_eq!(resolve_pages("first", 5).unwrap(), vec![1]);
        assert_eq!(resolve_pages("FIRST", 5).unwrap(), vec![1]);
        assert_eq!(resolve_pages("", 5).unwrap(), vec![1]);
    }

    #[test]
    fn first_of_empty_document_is_empty_not_an_error() {
        assert_eq!(resolve_pages("first", 0).unwrap(), Vec::<u32>::new());
        assert_eq!(resolve_pages("", 0).unwrap(), Vec::<u32>::new());
    }

    #[test]
    fn all_expands_to_every_page() {
        assert_eq!(resolve_pages("all", 3).unwrap(), vec![1, 2, 3]);
        assert_eq!(resolve_pages("All", 3).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn ranges_and_singles_merge_sorted_and_deduplicated() {
        assert_eq!(resolve_pages("2-4,1", 5).unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(resolve_pages("3,1-3,2", 5).unwrap(), vec![1, 2, 3]);
        assert_eq!(resolve_pages("5,1", 5).unwrap(), vec![1, 5]);
    }

    #[test]
    fn whitespace_is_tolerated() {
        assert_eq!(resolve_pages(" 1 , 3 - 4 ", 5).unwrap(), vec![1, 3, 4]);
    }

    #[test]
    fn out_of_range_fails_the_whole_expression() {
        assert_eq!(
            resolve_pages("6", 5),
            Err(PageRangeError::OutOfRange { page: 6, total: 5 })
        );
        // Valid tokens before the bad one must not leak through.
        assert!(resolve_pages("1,2,9", 5).is_err());
        assert_eq!(
            resolve_pages("0", 5),
            Err(PageRangeError::OutOfRange { page: 0, total: 5 })
        );
        assert!(resolve_pages("3-7", 5).is_err());
    }

    #[test]
    fn backwards_range_is_rejected() {
        assert_eq!(
            resolve_pages("2-1", 5),
            Err(PageRangeError::BackwardsRange { start: 2, end: 1 })
        );
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(matches!(
            resolve_pages("abc", 5),
            Err(PageRangeError::InvalidToken { .. })
        ));
        assert!(resolve_pages("1,,3", 5).is_err());
        assert!(resolve_pages("1-x", 5).is_err());
    }

    #[test]
    fn result_is_strictly_ascending_for_scrambled_input() {
        let pages = resolve_pages("4,2-3,1,4", 10).unwrap();
        assert!(pages.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(pages, vec![1, 2, 3, 4]);
    }
}
