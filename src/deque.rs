// Purpose: Double-ended queue built on a doubly-linked list closed into a
// ring by a heap-allocated sentinel cell.

use std::{
    fmt::Debug,
    hash::{Hash, Hasher},
    iter::FusedIterator,
    marker::PhantomData,
    mem,
    ptr::NonNull,
};

// =====================
// Struct Definitions
// =====================

/// The link shape shared by the sentinel and every data node.
///
/// All splicing is expressed on this shape alone, so inserting next to the
/// sentinel and inserting next to a data node are the same operation.
struct Links {
    prev: NonNull<Links>,
    next: NonNull<Links>,
}

/// A heap cell carrying one element.
///
/// `repr(C)` with the links first, so a pointer to the node and a pointer to
/// its links are interchangeable. The sentinel is a bare `Links` with no
/// element; a `Links` pointer may only be cast back to `Node<T>` when it is
/// known not to be the sentinel.
#[repr(C)]
struct Node<T> {
    links: Links,
    elem: T,
}

/// A double-ended queue represented as a circular doubly-linked list.
///
/// One link-only sentinel cell closes the list into a ring: `sentinel.next`
/// is the first element, `sentinel.prev` is the last, and an empty deque is
/// the sentinel linked to itself. Every push and pop at either end is a
/// constant-time splice next to the sentinel, with no null checks anywhere.
pub struct Deque<T> {
    sentinel: NonNull<Links>,
    len: usize,
    // The deque owns its nodes even though it only stores raw pointers.
    marker: PhantomData<Box<Node<T>>>,
}

/// Immutable reference iterator for Deque<T>.
/// Walks the ring from both ends; the remaining count detects the crossing
/// point so the sentinel is never dereferenced as a node.
pub struct Iter<'a, T> {
    head: NonNull<Links>,
    tail: NonNull<Links>,
    remaining: usize,
    marker: PhantomData<&'a Node<T>>,
}

/// Mutable reference iterator for Deque<T>.
pub struct IterMut<'a, T> {
    head: NonNull<Links>,
    tail: NonNull<Links>,
    remaining: usize,
    marker: PhantomData<&'a mut Node<T>>,
}

/// Consuming iterator for Deque<T>.
/// Pops from the front (or the back, when walked in reverse), so dropping it
/// mid-way frees whatever was not yielded.
pub struct IntoIter<T> {
    deque: Deque<T>,
}

// =====================
// Ring splicing
// =====================

impl Links {
    /// Splices `new` into the ring between `prev` and `next`.
    ///
    /// # Safety
    /// `prev` and `next` must be adjacent cells of a live ring, and `new`
    /// must not already be linked into any ring.
    unsafe fn splice(new: NonNull<Links>, mut prev: NonNull<Links>, mut next: NonNull<Links>) {
        unsafe {
            (*new.as_ptr()).prev = prev;
            (*new.as_ptr()).next = next;
            prev.as_mut().next = new;
            next.as_mut().prev = new;
        }
    }

    /// Unlinks `cell` from its ring, joining its two neighbors.
    ///
    /// # Safety
    /// `cell` must be a live cell of a ring. Its own links are left dangling;
    /// the caller is expected to free or relink it.
    unsafe fn unlink(cell: NonNull<Links>) {
        unsafe {
            let mut prev = cell.as_ref().prev;
            let mut next = cell.as_ref().next;
            prev.as_mut().next = next;
            next.as_mut().prev = prev;
        }
    }
}

// =====================
// Inherent impl blocks
// =====================

impl<T> Deque<T> {
    /// Creates an empty deque. Allocates the sentinel, nothing else.
    pub fn new() -> Self {
        let sentinel = NonNull::from(Box::leak(Box::new(Links {
            prev: NonNull::dangling(),
            next: NonNull::dangling(),
        })));
        // Close the empty ring: the sentinel is its own neighbor on both sides.
        unsafe {
            (*sentinel.as_ptr()).prev = sentinel;
            (*sentinel.as_ptr()).next = sentinel;
        }
        Self {
            sentinel,
            len: 0,
            marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// First cell of the ring. The sentinel itself when the deque is empty.
    fn head(&self) -> NonNull<Links> {
        unsafe { self.sentinel.as_ref().next }
    }

    /// Last cell of the ring. The sentinel itself when the deque is empty.
    fn tail(&self) -> NonNull<Links> {
        unsafe { self.sentinel.as_ref().prev }
    }

    /// Returns a reference to the first element, or `None` if empty.
    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            // Non-empty, so head() is a data node.
            unsafe { Some(&(*self.head().cast::<Node<T>>().as_ptr()).elem) }
        }
    }

    /// Returns a reference to the last element, or `None` if empty.
    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            unsafe { Some(&(*self.tail().cast::<Node<T>>().as_ptr()).elem) }
        }
    }

    pub fn front_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            None
        } else {
            unsafe { Some(&mut (*self.head().cast::<Node<T>>().as_ptr()).elem) }
        }
    }

    pub fn back_mut(&mut self) -> Option<&mut T> {
        if self.len == 0 {
            None
        } else {
            unsafe { Some(&mut (*self.tail().cast::<Node<T>>().as_ptr()).elem) }
        }
    }

    /// Allocates a node for `elem`. The links are filled in by the splice.
    fn alloc_node(elem: T) -> NonNull<Links> {
        let node = Box::new(Node {
            links: Links {
                prev: NonNull::dangling(),
                next: NonNull::dangling(),
            },
            elem,
        });
        NonNull::from(Box::leak(node)).cast()
    }

    /// Inserts an element at the front of the deque.
    pub fn push_front(&mut self, elem: T) {
        // The node is fully allocated before any link is touched, so a
        // failed allocation leaves the ring as it was.
        let node = Self::alloc_node(elem);
        unsafe {
            Links::splice(node, self.sentinel, self.head());
        }
        self.len += 1;
    }

    /// Inserts an element at the back of the deque.
    pub fn push_back(&mut self, elem: T) {
        let node = Self::alloc_node(elem);
        unsafe {
            Links::splice(node, self.tail(), self.sentinel);
        }
        self.len += 1;
    }

    /// Removes and returns the first element, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            let head = self.head();
            self.len -= 1;
            unsafe {
                // Unlink first, then reclaim the box and move the element out.
                Links::unlink(head);
                let node = Box::from_raw(head.cast::<Node<T>>().as_ptr());
                Some(node.elem)
            }
        }
    }

    /// Removes and returns the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            None
        } else {
            let tail = self.tail();
            self.len -= 1;
            unsafe {
                Links::unlink(tail);
                let node = Box::from_raw(tail.cast::<Node<T>>().as_ptr());
                Some(node.elem)
            }
        }
    }

    /// Removes all elements, leaving the sentinel ring empty.
    pub fn clear(&mut self) {
        while self.pop_front().is_some() {}
    }

    /// Exchanges the contents of two deques without copying elements.
    ///
    /// The sentinel lives on the heap, so this is a plain field swap: each
    /// ring keeps pointing at its own sentinel and no links need repair.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.sentinel, &mut other.sentinel);
        mem::swap(&mut self.len, &mut other.len);
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            head: self.head(),
            tail: self.tail(),
            remaining: self.len,
            marker: PhantomData,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut {
            head: self.head(),
            tail: self.tail(),
            remaining: self.len,
            marker: PhantomData,
        }
    }

    pub fn contains(&self, elem: &T) -> bool
    where
        T: PartialEq,
    {
        self.iter().any(|e| e == elem)
    }
}

// =====================
// Trait Implementations
// =====================

// The deque owns its elements; raw pointers alone would make it neither.
unsafe impl<T: Send> Send for Deque<T> {}
unsafe impl<T: Sync> Sync for Deque<T> {}

unsafe impl<T: Sync> Send for Iter<'_, T> {}
unsafe impl<T: Sync> Sync for Iter<'_, T> {}
unsafe impl<T: Send> Send for IterMut<'_, T> {}
unsafe impl<T: Sync> Sync for IterMut<'_, T> {}

// Drop for Deque<T>
impl<T> Drop for Deque<T> {
    fn drop(&mut self) {
        self.clear();
        // The sentinel outlives every node; free it last.
        unsafe {
            drop(Box::from_raw(self.sentinel.as_ptr()));
        }
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

// Clone for Deque<T>
impl<T: Clone> Clone for Deque<T> {
    fn clone(&self) -> Self {
        self.iter().cloned().collect()
    }

    /// Discards the existing contents first, then deep-copies `source`.
    fn clone_from(&mut self, source: &Self) {
        self.clear();
        self.extend(source.iter().cloned());
    }
}

// Iterator for Iter<'a, T>
impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            unsafe {
                let node = self.head.cast::<Node<T>>();
                self.head = (*node.as_ptr()).links.next;
                Some(&(*node.as_ptr()).elem)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            unsafe {
                let node = self.tail.cast::<Node<T>>();
                self.tail = (*node.as_ptr()).links.prev;
                Some(&(*node.as_ptr()).elem)
            }
        }
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

// Manual impl to avoid a T: Clone bound; cloning copies two pointers.
impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

// Iterator for IterMut<'a, T>
impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            unsafe {
                let node = self.head.cast::<Node<T>>();
                self.head = (*node.as_ptr()).links.next;
                Some(&mut (*node.as_ptr()).elem)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, T> DoubleEndedIterator for IterMut<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            unsafe {
                let node = self.tail.cast::<Node<T>>();
                self.tail = (*node.as_ptr()).links.prev;
                Some(&mut (*node.as_ptr()).elem)
            }
        }
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}
impl<T> FusedIterator for IterMut<'_, T> {}

// Iterator for IntoIter<T>
impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.deque.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.deque.len, Some(self.deque.len))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.deque.pop_back()
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}
impl<T> FusedIterator for IntoIter<T> {}

// IntoIterator for Deque<T>
impl<T> IntoIterator for Deque<T> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { deque: self }
    }
}

// IntoIterator for &Deque<T>
impl<'a, T> IntoIterator for &'a Deque<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// IntoIterator for &mut Deque<T>
impl<'a, T> IntoIterator for &'a mut Deque<T> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// Extend for Deque<T>
impl<T> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for elem in iter {
            self.push_back(elem);
        }
    }
}

// FromIterator for Deque<T>
impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Deque::new();
        deque.extend(iter);
        deque
    }
}

// From<[T; N]> for Deque<T>
impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(elems: [T; N]) -> Self {
        elems.into_iter().collect()
    }
}

// From<Vec<T>> for Deque<T>
impl<T> From<Vec<T>> for Deque<T> {
    fn from(vec: Vec<T>) -> Self {
        vec.into_iter().collect()
    }
}

// PartialEq for Deque<T>
impl<T: PartialEq> PartialEq for Deque<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

// Eq for Deque<T>
impl<T: Eq> Eq for Deque<T> {}

impl<T: PartialOrd> PartialOrd for Deque<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord> Ord for Deque<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: Hash> Hash for Deque<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for elem in self {
            elem.hash(state);
        }
    }
}

// Debug for Deque<T>
impl<T: Debug> Debug for Deque<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// =====================
// Tests
// =====================
