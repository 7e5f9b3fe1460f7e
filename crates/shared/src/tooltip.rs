/// Every n-th point gets a label, counting from the n-th.
const LABEL_EVERY: usize = 5;

/// 1-based label for the point at `index`, if it should show one.
///
/// The first and last points are always labeled, plus indices 4, 9, 14, ...
pub fn tooltip_label(index: usize, total: usize) -> Option<usize> {
    let is_first = index == 0;
    let is_last = total > 0 && index == total - 1;
    let is_nth = index % LABEL_EVERY == LABEL_EVERY - 1;
    if is_first || is_last || is_nth {
        Some(index + 1)
    } else {
        None
    }
}
