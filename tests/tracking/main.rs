#![cfg_attr(feature = "allocator_api", feature(allocator_api))]


use std::cell::Cell;
use std::panic;
use std::panic::AssertUnwindSafe;
use expect_test::expect;
use sllist::AllocError;
use sllist::Error;
use sllist::List;
use crate::allocator::Drops;
use crate::allocator::Tracker;

fn contents<T: Copy, A: allocator_api2::alloc::Allocator>(list: &List<T, A>) -> Vec<T> {
  let mut r = Vec::new();
  list.traverse(|x| r.push(*x));
  r
}

#[test]
fn test_empty_list_allocates_nothing() {
  let tracker = Tracker::new();
  let list = List::<u64, _>::new_in(&tracker);
  assert!(list.len() == 0);
  list.destroy();
  assert!(tracker.allocs() == 0);
  assert!(tracker.frees() == 0);
}

#[test]
fn test_one_allocation_per_node() {
  let tracker = Tracker::new();
  let mut list = List::new_in(&tracker);
  list.insert_front(1_u64);
  list.insert_end(2);
  list.insert_at(1, 3).unwrap();
  assert!(tracker.allocs() == 3);
  assert!(tracker.live() == 3);
  assert!(list.remove_front() == Some(1));
  assert!(list.remove_end() == Some(2));
  assert!(tracker.live() == 1);
  list.destroy();
  assert!(tracker.allocs() == 3);
  assert!(tracker.frees() == 3);
}

#[test]
fn test_destroy_frees_everything_once() {
  let tracker = Tracker::new();
  let drops = Drops::new();
  let mut list = List::new_in(&tracker);
  for i in 0 .. 100 { list.insert_end(drops.make(i)); }
  assert!(tracker.live() == 100);
  list.destroy();
  assert!(tracker.live() == 0);
  assert!(tracker.frees() == 100);
  assert!(drops.get() == 100);
}

#[test]
fn test_clear_frees_everything_once() {
  let tracker = Tracker::new();
  let drops = Drops::new();
  let mut list = List::new_in(&tracker);
  for i in 0 .. 10 { list.insert_front(drops.make(i)); }
  list.clear();
  assert!(tracker.live() == 0);
  assert!(drops.get() == 10);
  list.clear();
  assert!(tracker.frees() == 10);
  assert!(drops.get() == 10);
}

#[test]
fn test_removed_values_are_returned_not_dropped() {
  let tracker = Tracker::new();
  let drops = Drops::new();
  let mut list = List::new_in(&tracker);
  list.insert_end(drops.make(1));
  list.insert_end(drops.make(2));
  list.insert_end(drops.make(3));
  let x = list.remove_at(1).ok();
  assert!(x.as_ref().map(|x| x.0) == Some(2));
  assert!(drops.get() == 0);
  assert!(tracker.live() == 2);
  drop(x);
  assert!(drops.get() == 1);
  drop(list);
  assert!(drops.get() == 3);
  assert!(tracker.live() == 0);
}

#[test]
fn test_out_of_bounds_insert_allocates_nothing() {
  let tracker = Tracker::new();
  let mut list = List::new_in(&tracker);
  list.insert_end(1_u64);
  assert!(list.insert_at(2, 9).is_err());
  assert!(list.try_insert_at(5, 9).is_err());
  assert!(tracker.allocs() == 1);
  assert!(list.remove_at(1).is_err());
  assert!(tracker.frees() == 0);
}

#[test]
fn test_failed_allocation_leaves_list_unchanged() {
  let tracker = Tracker::with_budget(2);
  let mut list = List::new_in(&tracker);
  assert!(list.try_insert_end(1_u64) == Ok(()));
  assert!(list.try_insert_front(0) == Ok(()));
  assert!(list.try_insert_front(7) == Err(AllocError));
  assert!(list.try_insert_end(7) == Err(AllocError));
  assert!(list.try_insert_at(1, 7) == Err(Error::AllocFailed));
  assert!(contents(&list) == [0, 1]);
  assert!(list.len() == 2);
  assert!(tracker.live() == 2);

  tracker.set_budget(1);
  assert!(list.try_insert_at(1, 5) == Ok(()));
  expect!["[0, 5, 1]"].assert_eq(&format!("{:?}", list));
}

#[test]
fn test_failed_allocation_drops_value() {
  let tracker = Tracker::with_budget(0);
  let drops = Drops::new();
  let mut list = List::new_in(&tracker);
  assert!(list.try_insert_front(drops.make(1)).is_err());
  assert!(drops.get() == 1);
  assert!(list.is_empty());
}

#[test]
fn test_mixed_operations_balance() {
  let tracker = Tracker::new();
  let mut list = List::new_in(&tracker);
  let mut inserted = 0;
  let mut removed = 0;
  for i in 0 .. 200_usize {
    let ok =
      match i % 6 {
        0 => list.try_insert_front(i).is_ok(),
        1 => list.try_insert_end(i).is_ok(),
        2 => list.try_insert_at(i % 5, i).is_ok(),
        3 => { let _ = list.remove_at(i % 3).map(|_| removed = removed + 1); false }
        4 => { let _ = list.remove_end().map(|_| removed = removed + 1); false }
        _ => { let _ = list.remove_front().map(|_| removed = removed + 1); false }
      };
    if ok { inserted = inserted + 1; }
    assert!(list.len() == inserted - removed);
    assert!(tracker.live() == inserted - removed);
  }
  list.destroy();
  assert!(tracker.allocs() == tracker.frees());
}

#[test]
fn test_panicking_drop_frees_every_node() {
  struct Bomb<'a>(bool, &'a Cell<usize>);

  impl<'a> Drop for Bomb<'a> {
    fn drop(&mut self) {
      self.1.set(self.1.get() + 1);
      if self.0 { panic!("bomb"); }
    }
  }

  let tracker = Tracker::new();
  let drops = Cell::new(0);
  let mut list = List::new_in(&tracker);
  for i in 0 .. 5 { list.insert_end(Bomb(i == 1, &drops)); }
  assert!(tracker.live() == 5);

  let r = panic::catch_unwind(AssertUnwindSafe(|| drop(list)));

  assert!(r.is_err());
  assert!(tracker.live() == 0);
  assert!(tracker.frees() == 5);
  assert!(drops.get() == 5);
}

#[test]
fn test_panicking_drop_during_clear() {
  struct Bomb(bool);

  impl Drop for Bomb {
    fn drop(&mut self) {
      if self.0 { panic!("bomb"); }
    }
  }

  let tracker = Tracker::new();
  let mut list = List::new_in(&tracker);
  list.insert_end(Bomb(true));
  list.insert_end(Bomb(false));
  list.insert_end(Bomb(false));

  let r = panic::catch_unwind(AssertUnwindSafe(|| list.clear()));

  assert!(r.is_err());
  assert!(list.is_empty());
  assert!(tracker.live() == 0);
  list.insert_front(Bomb(false));
  assert!(list.len() == 1);
}
