/// Up to five page numbers around `current`, clamped to `1..=total`.
pub fn page_window(current: u32, total: u32) -> Vec<u32> {
    let count = i64::from(total.min(5));
    let start = (i64::from(total) - 4).min(i64::from(current) - 2).max(1);
    (0..count).map(|offset| (start + offset) as u32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_slides_with_current_page() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(6, 10), vec![4, 5, 6, 7, 8]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn short_listings_show_every_page() {
        assert_eq!(page_window(2, 3), vec![1, 2, 3]);
        assert_eq!(page_window(1, 1), vec![1]);
        assert!(page_window(1, 0).is_empty());
    }
}
