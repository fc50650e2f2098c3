//! Copy-on-write helpers shared by every list in a survey record.

use super::domain::{EntryId, Identified};
use super::edits::{EditError, ListKind};

pub(crate) fn appended<T: Clone>(list: &[T], item: T) -> Vec<T> {
    let mut next = Vec::with_capacity(list.len() + 1);
    next.extend_from_slice(list);
    next.push(item);
    next
}

pub(crate) fn updated_at<T, F>(
    list: &[T],
    kind: ListKind,
    index: usize,
    update: F,
) -> Result<Vec<T>, EditError>
where
    T: Clone,
    F: FnOnce(T) -> T,
{
    let current = list.get(index).cloned().ok_or(EditError::IndexOutOfRange {
        list: kind,
        index,
        len: list.len(),
    })?;

    let mut next = list.to_vec();
    next[index] = update(current);
    Ok(next)
}

pub(crate) fn removed_at<T: Clone>(
    list: &[T],
    kind: ListKind,
    index: usize,
) -> Result<Vec<T>, EditError> {
    if index >= list.len() {
        return Err(EditError::IndexOutOfRange {
            list: kind,
            index,
            len: list.len(),
        });
    }

    Ok(list
        .iter()
        .enumerate()
        .filter(|(position, _)| *position != index)
        .map(|(_, item)| item.clone())
        .collect())
}

pub(crate) fn removed_by_id<T: Clone + Identified>(
    list: &[T],
    kind: ListKind,
    id: &EntryId,
) -> Result<Vec<T>, EditError> {
    if !list.iter().any(|item| item.id() == id) {
        return Err(EditError::EntryNotFound {
            list: kind,
            id: id.clone(),
        });
    }

    Ok(list.iter().filter(|item| item.id() != id).cloned().collect())
}

/// Fresh identifier that does not collide with any row already in the list,
/// including rows restored from storage.
pub(crate) fn fresh_id<T: Identified>(list: &[T]) -> EntryId {
    loop {
        let candidate = EntryId::generate(T::PREFIX);
        if !list.iter().any(|item| item.id() == &candidate) {
            return candidate;
        }
    }
}
