use core::alloc::Layout;
use core::ptr::NonNull;
use allocator_api2::alloc::Allocator;

#[inline(always)]
pub(crate) const fn cast<T, U>(x: NonNull<T>) -> NonNull<U>
where
  T: ?Sized
{
  x.cast()
}

#[inline(always)]
pub(crate) unsafe fn write<T>(x: NonNull<T>, y: T) {
  x.as_ptr().write(y)
}

#[inline(always)]
pub(crate) unsafe fn read<T>(x: NonNull<T>) -> T {
  x.as_ptr().read()
}

#[inline(always)]
pub(crate) unsafe fn as_ref<'a, T>(x: NonNull<T>) -> &'a T
where
  T: ?Sized
{
  &*x.as_ptr()
}

#[inline(always)]
pub(crate) unsafe fn as_mut_ref<'a, T>(x: NonNull<T>) -> &'a mut T
where
  T: ?Sized
{
  &mut *x.as_ptr()
}

// NB: `Layout::new::<T>()` is never zero-sized for the node types we
// allocate, since every node carries a link.

#[inline(always)]
pub(crate) fn alloc<T, A>(allocator: &A) -> Option<NonNull<T>>
where
  A: Allocator
{
  match allocator.allocate(Layout::new::<T>()) {
    Ok(p) => Some(cast(p)),
    Err(_) => None,
  }
}

#[inline(always)]
pub(crate) unsafe fn dealloc<T, A>(allocator: &A, x: NonNull<T>)
where
  A: Allocator
{
  allocator.deallocate(cast(x), Layout::new::<T>())
}
