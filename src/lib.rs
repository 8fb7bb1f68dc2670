//! Linked-list collections: a sentinel-ring deque and a persistent
//! association list.
//!
//! [`Deque`] is a double-ended queue built directly on a circular
//! doubly-linked list. A heap-allocated link-only sentinel closes the list
//! into a ring, which gives O(1) pushes and pops at both ends and
//! bidirectional iteration without any null-pointer special cases.
//!
//! [`Env`] is an independent, much smaller structure: an immutable
//! singly-linked association list meant for interpreter lexical
//! environments, where extending is O(1) with structural sharing and
//! a missing binding is a recoverable [`BindingNotFound`] error.

pub mod deque;
pub mod env;

pub use deque::Deque;
pub use env::{BindingNotFound, Env};
