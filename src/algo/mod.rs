/*!
Stateless routines over a `(contract, slice)` view.

Everything here works on plain slices, so the same code backs [`Vector`](crate::Vector)
and any caller-owned storage. Element relocation always goes through
[`ElementContract::move_to`](crate::ElementContract::move_to), never a raw byte copy.

Not-found results are `None`; comparators are `FnMut(&T, &T) -> Ordering` and
predicates `FnMut(&T) -> bool`.
*/

pub mod compare;
pub mod mutate;
pub mod search;
pub mod sort;

pub use compare::{Comparison, compare, equals, max_position, maximum, min_position, minimum};
pub use mutate::{choose, fill, for_each, partition, replace, replace_if, reverse, shuffle, swap};
pub use search::{
    all, any, binary_search, contains, count, count_if, find, find_if, find_last, find_last_if,
    look, lower_bound, none, upper_bound,
};
pub use sort::{sort, sorted, stable_sort};
