//! The pointers range encoding.
//!
//! One flat child array stands in for `N` sibling sub-collections through a
//! pointers array `p` of `N + 1` entries (1-based positions into the child):
//!
//! - `p[i] < 0`: sub-collection `i` is null; `|p[i]|` is still the boundary
//!   the preceding sub-collection needs.
//! - `p[i] > 0`: sub-collection `i` occupies `[p[i], |p[i + 1]|)`.
//! - `p[N]` is a pure sentinel.
//!
//! `[[A, B], null, [C], [], [D, E, F]]` encodes to data `[A..F]` with
//! pointers `[1, -3, 3, 4, 4, 7]`. Deeper nesting encodes the flattened
//! level again.

use flatbind_foundation::{Error, Result};

/// A pointers array together with the flat data it addresses.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ranges<T> {
    pointers: Vec<i64>,
    data: Vec<T>,
}

impl<T> Ranges<T> {
    /// Encodes a sequence of possibly-null sub-collections.
    pub fn encode<I, S>(sub_collections: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: IntoIterator<Item = T>,
    {
        let mut pointers = Vec::new();
        let mut data = Vec::new();
        let mut next: i64 = 1;
        for sub in sub_collections {
            match sub {
                None => pointers.push(-next),
                Some(items) => {
                    pointers.push(next);
                    for item in items {
                        data.push(item);
                        next += 1;
                    }
                }
            }
        }
        pointers.push(next);
        Self { pointers, data }
    }

    /// Wraps a single top-level collection as the degenerate `[1, len + 1]` pair.
    #[must_use]
    pub fn simple(data: Vec<T>) -> Self {
        let end = position(data.len());
        Self {
            pointers: vec![1, end],
            data,
        }
    }

    /// Validates received pointers against their data.
    ///
    /// # Errors
    ///
    /// Returns a malformed ranges error if the pointers are empty, contain
    /// zero, decrease in magnitude, address past the data, or end in a
    /// sentinel other than `data.len() + 1`.
    pub fn from_parts(pointers: Vec<i64>, data: Vec<T>) -> Result<Self> {
        let Some(&sentinel) = pointers.last() else {
            return Err(Error::malformed_ranges("empty pointers array"));
        };
        let end = position(data.len());
        if sentinel != end {
            return Err(Error::malformed_ranges(format!(
                "sentinel {sentinel} does not close data of length {}",
                data.len()
            )));
        }
        if let Some(i) = pointers.iter().position(|&p| p == 0) {
            return Err(Error::malformed_ranges(format!("zero pointer at {i}")));
        }
        if pointers[0].unsigned_abs() != 1 {
            return Err(Error::malformed_ranges("first range does not start at 1"));
        }
        for (i, pair) in pointers.windows(2).enumerate() {
            let (lower, upper) = (pair[0].unsigned_abs(), pair[1].unsigned_abs());
            if lower > upper {
                return Err(Error::malformed_ranges(format!(
                    "range {i} runs backwards: {lower} > {upper}"
                )));
            }
        }
        Ok(Self { pointers, data })
    }

    /// Returns the pointers array.
    #[must_use]
    pub fn pointers(&self) -> &[i64] {
        &self.pointers
    }

    /// Returns the flat data.
    #[must_use]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns the number of sub-collections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pointers.len().saturating_sub(1)
    }

    /// Returns true if there are no sub-collections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns sub-collection `index` (0-based).
    ///
    /// `None` if out of range; `Some(None)` if the sub-collection is null.
    #[must_use]
    pub fn slice(&self, index: usize) -> Option<Option<&[T]>> {
        if index >= self.len() {
            return None;
        }
        let lower = self.pointers[index];
        if lower < 0 {
            return Some(None);
        }
        let start = offset(lower);
        let stop = offset(self.pointers[index + 1].abs());
        Some(self.data.get(start..stop))
    }

    /// Iterates the sub-collections in order.
    pub fn iter(&self) -> impl Iterator<Item = Option<&[T]>> {
        (0..self.len()).map(|i| self.slice(i).flatten())
    }

    /// Splits into pointers and data.
    #[must_use]
    pub fn into_parts(self) -> (Vec<i64>, Vec<T>) {
        (self.pointers, self.data)
    }
}

impl<T: Clone> Ranges<T> {
    /// Decodes back into the original sub-collections.
    #[must_use]
    pub fn decode(&self) -> Vec<Option<Vec<T>>> {
        self.iter().map(|sub| sub.map(<[T]>::to_vec)).collect()
    }
}

/// Encodes nested-table sub-collections whose slots may have been deleted.
///
/// Surviving elements go to the data ranges; every logical slot gets a flag
/// in the deletion ranges (`true` = deleted). Both share the null pattern.
pub fn encode_sparse<I, S, T>(sub_collections: I) -> (Ranges<T>, Ranges<bool>)
where
    I: IntoIterator<Item = Option<S>>,
    S: IntoIterator<Item = Option<T>>,
{
    let mut data_subs: Vec<Option<Vec<T>>> = Vec::new();
    let mut flag_subs: Vec<Option<Vec<bool>>> = Vec::new();
    for sub in sub_collections {
        match sub {
            None => {
                data_subs.push(None);
                flag_subs.push(None);
            }
            Some(slots) => {
                let mut items = Vec::new();
                let mut flags = Vec::new();
                for slot in slots {
                    flags.push(slot.is_none());
                    items.extend(slot);
                }
                data_subs.push(Some(items));
                flag_subs.push(Some(flags));
            }
        }
    }
    (Ranges::encode(data_subs), Ranges::encode(flag_subs))
}

/// Reverses [`encode_sparse`].
///
/// # Errors
///
/// Returns a malformed ranges error if the two ranges disagree on the number
/// of sub-collections, on which are null, or on how many slots survive.
pub fn decode_sparse<T: Clone>(
    data: &Ranges<T>,
    deletions: &Ranges<bool>,
) -> Result<Vec<Option<Vec<Option<T>>>>> {
    if data.len() != deletions.len() {
        return Err(Error::malformed_ranges(format!(
            "{} data sub-collections but {} deletion sub-collections",
            data.len(),
            deletions.len()
        )));
    }
    data.iter()
        .zip(deletions.iter())
        .enumerate()
        .map(|(i, pair)| match pair {
            (None, None) => Ok(None),
            (Some(items), Some(flags)) => {
                let survivors = flags.iter().filter(|deleted| !**deleted).count();
                if survivors != items.len() {
                    return Err(Error::malformed_ranges(format!(
                        "sub-collection {i} has {} items for {survivors} live slots",
                        items.len()
                    )));
                }
                let mut items = items.iter();
                Ok(Some(
                    flags
                        .iter()
                        .map(|deleted| if *deleted { None } else { items.next().cloned() })
                        .collect(),
                ))
            }
            _ => Err(Error::malformed_ranges(format!(
                "sub-collection {i} is null in only one of data and deletions"
            ))),
        })
        .collect()
}

fn position(len: usize) -> i64 {
    i64::try_from(len).map_or(i64::MAX, |len| len + 1)
}

fn offset(pointer: i64) -> usize {
    usize::try_from(pointer - 1).unwrap_or(0)
}
