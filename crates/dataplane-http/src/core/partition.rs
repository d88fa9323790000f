/// Split `items` into consecutive groups of at most `size` elements.
///
/// A `size` of zero is treated as one.
pub fn partition<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
    let size = size.max(1);
    let mut groups = Vec::with_capacity(items.len().div_ceil(size));
    let mut current = Vec::with_capacity(size);
    for item in items {
        current.push(item);
        if current.len() == size {
            groups.push(std::mem::replace(&mut current, Vec::with_capacity(size)));
        }
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}
