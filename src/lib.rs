#![no_std]
/*!
A growable vector and a library of sequence algorithms, both driven by an explicit
per-element contract instead of the element type's own traits.

An [`ElementContract`] tells a container how to copy, relocate, compare and destroy
its elements and where their memory comes from. [`Natural`] builds one from `Clone`
and `PartialEq`, [`Tagged`] does the same under a caller-chosen type token so that two
containers of the same Rust type can still refuse to be mixed.

Containers never copy an element unless asked to: growth, insertion, erasure, sorting
and shuffling only move. Misuse is reported through [`ContainerError`] rather than
panics; only `Index`/`IndexMut` panic on a bad index.

# Examples

## Using `Vector`

```rust
use contract_vec::{Natural, Vector};

let mut v = Vector::new(Natural::<u32>::new()).unwrap();
for x in [9, 4, 7, 1] {
    v.push_back_move(x).unwrap();
}
v.insert_copy(0, &3).unwrap();
assert_eq!(v.as_slice().unwrap(), &[3, 9, 4, 7, 1]);

v.sort(u32::cmp).unwrap();
assert_eq!(v.binary_search(&7, u32::cmp).unwrap(), Some(3));

// remove the odd ones, keeping the order of the rest
assert_eq!(v.erase_if(|x| x % 2 == 1).unwrap(), 4);
assert_eq!(v.as_slice().unwrap(), &[4]);
```

## Refusing to mix types

```rust
use contract_vec::{ContainerError, Tagged, Vector};

let meters = Vector::from_slice(Tagged::<f64>::new("meters"), &[1.0, 2.0]).unwrap();
let seconds = Vector::from_slice(Tagged::<f64>::new("seconds"), &[1.0, 2.0]).unwrap();

assert_eq!(
    meters.equals(&seconds),
    Err(ContainerError::TypeMismatch { left: "meters", right: "seconds" })
);
```

## Using the algorithms on plain slices

Everything in [`algo`] works on any slice, not just a [`Vector`].

```rust
use contract_vec::Natural;
use contract_vec::algo;

let c = Natural::<&str>::new();
let mut words = ["pear", "fig", "apple", "kiwi"];

algo::stable_sort(&c, &mut words, |a, b| a.len().cmp(&b.len())).unwrap();
assert_eq!(words, ["fig", "pear", "kiwi", "apple"]);

let split = algo::partition(&c, &mut words, |w| w.contains('i')).unwrap();
assert_eq!(split, 2);
assert_eq!(words, ["fig", "kiwi", "pear", "apple"]);
assert_eq!(algo::find(&c, &words, 0, &"pear"), Some(2));
```
*/
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod algo;
mod buffer;
pub mod config;
pub mod contract;
pub mod error;
pub mod vector;

pub use algo::Comparison;
pub use config::VecConfig;
pub use contract::{ElementContract, Natural, Tagged};
pub use error::{ContainerError, Result};
pub use vector::Vector;
