#![doc = include_str!("../README.md")]
#![no_std]
#![cfg_attr(feature = "allocator_api", feature(allocator_api))]

extern crate alloc;

use allocator_api2::alloc::Allocator;
use allocator_api2::alloc::Global;
use core::alloc::Layout;
use core::fmt;
use core::marker::PhantomData;
use core::ptr::NonNull;

pub use allocator_api2::alloc::AllocError;

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// SUBMODULES                                                                 //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

mod ptr;

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// PUBLIC TYPE AND TRAIT DEFINITIONS                                          //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

/// A singly linked list in which every element lives in its own node,
/// allocated from `A`.
///
/// The list exclusively owns its first node and every node exclusively owns
/// its successor. Elements are moved into the list on insertion and are
/// either handed back by the `remove_*` methods or dropped when the list is
/// cleared or destroyed.
///
/// Most operations walk the chain from the head, so everything except
/// [`insert_front`](Self::insert_front) and
/// [`remove_front`](Self::remove_front) is linear in the length of the list.

pub struct List<T, A: Allocator = Global> {
  head: Link<T>,
  allocator: A,
  marker: PhantomData<T>,
}

unsafe impl<T, A: Allocator> Send for List<T, A> where T: Send, A: Send { }

unsafe impl<T, A: Allocator> Sync for List<T, A> where T: Sync, A: Sync { }

/// An index was past the end of the list.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexOutOfBounds {
  /// The index that was requested.
  pub index: usize,
  /// The length of the list at the time of the request.
  pub len: usize,
}

/// The error type for fallible insertion at an index.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
  /// The allocator failed to provide memory for a new node.
  AllocFailed,
  /// The index was past the end of the list.
  IndexOutOfBounds(IndexOutOfBounds),
}

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// PRIVATE TYPE AND TRAIT DEFINITIONS                                         //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

type Link<T> = Option<NonNull<Node<T>>>;

struct Node<T> {
  value: T,
  next: Link<T>,
}

enum Panicked { }

trait Fail: Sized {
  fn fail<T>(_: Layout) -> Result<T, Self>;
}

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// UTILITY FUNCTIONS                                                          //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

#[inline(always)]
fn unwrap<T>(x: Result<T, Panicked>) -> T {
  match x { Ok(x) => x, Err(e) => match e { } }
}

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// Fail                                                                       //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

impl Fail for Panicked {
  #[inline(never)]
  #[cold]
  fn fail<T>(layout: Layout) -> Result<T, Self> {
    alloc::alloc::handle_alloc_error(layout)
  }
}

impl Fail for AllocError {
  #[inline(always)]
  fn fail<T>(_: Layout) -> Result<T, Self> {
    Err(AllocError)
  }
}

impl Fail for Error {
  #[inline(always)]
  fn fail<T>(_: Layout) -> Result<T, Self> {
    Err(Error::AllocFailed)
  }
}

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// Links                                                                      //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

// Every function here takes the link slot and the allocator separately, so
// that a method can hold a mutable borrow of `head` while allocating.

#[inline(always)]
fn insert<T, A, E>(link: &mut Link<T>, allocator: &A, value: T) -> Result<(), E>
where
  A: Allocator,
  E: Fail,
{
  let Some(p) = ptr::alloc::<Node<T>, A>(allocator) else {
    return E::fail(Layout::new::<Node<T>>());
  };

  unsafe { ptr::write(p, Node { value, next: *link }) };

  *link = Some(p);
  Ok(())
}

#[inline(always)]
fn remove<T, A>(link: &mut Link<T>, allocator: &A) -> Option<T>
where
  A: Allocator,
{
  let p = (*link)?;

  // SAFETY:
  //
  // - `p` was allocated by `insert` with this allocator and is reachable
  //   only through `link`, which we overwrite before returning.

  let node = unsafe { ptr::read(p) };
  unsafe { ptr::dealloc(allocator, p) };

  *link = node.next;
  Some(node.value)
}

// SAFETY (for the walks below):
//
// - Every `Some(p)` reached from `head` points to a live node written by
//   `insert`, and the borrow of `head` excludes any other access to it.

// Returns the slot which holds the node at `index`. The slot one past the
// last node is the trailing `None`, so `index == len` succeeds.

fn link_at<T>(head: &mut Link<T>, index: usize) -> Result<&mut Link<T>, IndexOutOfBounds> {
  let mut link = head;
  let mut i = 0;

  while i < index {
    let Some(p) = *link else {
      return Err(IndexOutOfBounds { index, len: i });
    };
    link = unsafe { &mut ptr::as_mut_ref(p).next };
    i = i + 1;
  }

  Ok(link)
}

// The trailing `None` slot.

fn tail<T>(head: &mut Link<T>) -> &mut Link<T> {
  let mut link = head;

  while let Some(p) = *link {
    link = unsafe { &mut ptr::as_mut_ref(p).next };
  }

  link
}

// The slot which holds the last node, or `head` if the list is empty.

fn last<T>(head: &mut Link<T>) -> &mut Link<T> {
  let mut link = head;

  while let Some(p) = *link {
    let next = unsafe { &mut ptr::as_mut_ref(p).next };
    if next.is_none() { break; }
    link = next;
  }

  link
}

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// List                                                                       //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

impl<T> List<T, Global> {
  /// Creates an empty list backed by the global allocator.
  ///
  /// No memory is allocated until the first element is inserted.

  pub const fn new() -> Self {
    Self::new_in(Global)
  }
}

impl<T, A: Allocator> List<T, A> {
  /// Creates an empty list whose nodes will be allocated from the given
  /// allocator.

  pub const fn new_in(allocator: A) -> Self {
    Self {
      head: None,
      allocator,
      marker: PhantomData,
    }
  }

  /// A reference to the backing allocator.

  pub fn allocator(&self) -> &A {
    &self.allocator
  }

  /// Inserts an element at the front of the list in constant time.
  ///
  /// # Panics
  ///
  /// Panics on failure to allocate memory.

  pub fn insert_front(&mut self, value: T) {
    unwrap(insert(&mut self.head, &self.allocator, value))
  }

  /// Inserts an element at the front of the list in constant time.
  ///
  /// # Errors
  ///
  /// An error is returned on failure to allocate memory, in which case the
  /// list is unchanged and `value` is dropped.

  pub fn try_insert_front(&mut self, value: T) -> Result<(), AllocError> {
    insert(&mut self.head, &self.allocator, value)
  }

  /// Appends an element to the end of the list.
  ///
  /// # Panics
  ///
  /// Panics on failure to allocate memory.

  pub fn insert_end(&mut self, value: T) {
    unwrap(insert(tail(&mut self.head), &self.allocator, value))
  }

  /// Appends an element to the end of the list.
  ///
  /// # Errors
  ///
  /// An error is returned on failure to allocate memory, in which case the
  /// list is unchanged and `value` is dropped.

  pub fn try_insert_end(&mut self, value: T) -> Result<(), AllocError> {
    insert(tail(&mut self.head), &self.allocator, value)
  }

  /// Inserts an element so that it ends up at position `index`.
  ///
  /// An `index` of zero is the same as [`insert_front`](Self::insert_front)
  /// and an `index` equal to the length is the same as
  /// [`insert_end`](Self::insert_end).
  ///
  /// # Errors
  ///
  /// An error is returned if `index` is greater than the length of the list.
  /// Nothing is allocated in that case.
  ///
  /// # Panics
  ///
  /// Panics on failure to allocate memory.

  pub fn insert_at(&mut self, index: usize, value: T) -> Result<(), IndexOutOfBounds> {
    let link = link_at(&mut self.head, index)?;
    unwrap(insert(link, &self.allocator, value));
    Ok(())
  }

  /// Inserts an element so that it ends up at position `index`.
  ///
  /// # Errors
  ///
  /// An error is returned if `index` is greater than the length of the list
  /// or on failure to allocate memory. Either way the list is unchanged.

  pub fn try_insert_at(&mut self, index: usize, value: T) -> Result<(), Error> {
    let link = link_at(&mut self.head, index)?;
    insert(link, &self.allocator, value)
  }

  /// Removes the first element and returns it, or `None` if the list is
  /// empty.

  pub fn remove_front(&mut self) -> Option<T> {
    remove(&mut self.head, &self.allocator)
  }

  /// Removes the last element and returns it, or `None` if the list is
  /// empty.

  pub fn remove_end(&mut self) -> Option<T> {
    remove(last(&mut self.head), &self.allocator)
  }

  /// Removes the element at position `index` and returns it.
  ///
  /// # Errors
  ///
  /// An error is returned if there is no element at `index`. The list is
  /// unchanged in that case.

  pub fn remove_at(&mut self, index: usize) -> Result<T, IndexOutOfBounds> {
    let link = link_at(&mut self.head, index)?;
    match remove(link, &self.allocator) {
      Some(x) => Ok(x),
      None => Err(IndexOutOfBounds { index, len: index }),
    }
  }

  /// Drops every element and frees every node. The list stays usable.

  pub fn clear(&mut self) {
    // If an element's `drop` panics, the guard frees the rest of the chain
    // while unwinding.

    struct Guard<'a, T, A: Allocator>(&'a mut List<T, A>);

    impl<'a, T, A: Allocator> Drop for Guard<'a, T, A> {
      fn drop(&mut self) {
        while remove(&mut self.0.head, &self.0.allocator).is_some() { }
      }
    }

    let guard = Guard(self);

    while remove(&mut guard.0.head, &guard.0.allocator).is_some() { }

    core::mem::forget(guard);
  }

  /// Drops every element, frees every node and then the list itself.

  pub fn destroy(self) {
    drop(self)
  }

  /// The number of elements. This walks the whole list.

  pub fn len(&self) -> usize {
    let mut n = 0;
    self.traverse(|_| n = n + 1);
    n
  }

  /// Whether the list has no elements.

  pub fn is_empty(&self) -> bool {
    self.head.is_none()
  }

  /// A reference to the element at position `index`, if any.

  pub fn get(&self, index: usize) -> Option<&T> {
    let mut link = self.head;
    let mut i = 0;

    while let Some(p) = link {
      // SAFETY:
      //
      // - `p` is reachable from `head`, and `&self` keeps it alive.

      let node = unsafe { ptr::as_ref(p) };
      if i == index { return Some(&node.value); }
      link = node.next;
      i = i + 1;
    }

    None
  }

  /// Calls `f` once on each element, from front to back.

  pub fn traverse<F>(&self, f: F)
  where
    F: FnMut(&T)
  {
    let mut f = f;
    let mut link = self.head;

    while let Some(p) = link {
      // SAFETY:
      //
      // - `p` is reachable from `head`, and `&self` keeps it alive.

      let node = unsafe { ptr::as_ref(p) };
      f(&node.value);
      link = node.next;
    }
  }
}

impl<T> Default for List<T, Global> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T, A: Allocator> Drop for List<T, A> {
  fn drop(&mut self) {
    self.clear()
  }
}

impl<T, A: Allocator> fmt::Debug for List<T, A>
where
  T: fmt::Debug
{
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut f = f.debug_list();
    self.traverse(|x| { let _ = f.entry(x); });
    f.finish()
  }
}

////////////////////////////////////////////////////////////////////////////////
//                                                                            //
// Errors                                                                     //
//                                                                            //
////////////////////////////////////////////////////////////////////////////////

impl fmt::Display for IndexOutOfBounds {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "index {} is out of bounds for a list of length {}", self.index, self.len)
  }
}

impl core::error::Error for IndexOutOfBounds { }

impl fmt::Display for Error {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Error::AllocFailed => f.write_str("memory allocation failed"),
      Error::IndexOutOfBounds(e) => fmt::Display::fmt(e, f),
    }
  }
}

impl core::error::Error for Error { }

impl From<AllocError> for Error {
  fn from(_: AllocError) -> Self {
    Error::AllocFailed
  }
}

impl From<IndexOutOfBounds> for Error {
  fn from(e: IndexOutOfBounds) -> Self {
    Error::IndexOutOfBounds(e)
  }
}
