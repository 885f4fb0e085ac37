//! # Kernel synchronization primitives
//!
//! The heap lists are partitioned per core and need no locking; what remains
//! shared across harts is small:
//!
//! - [`SpinLock`] serializes the physical page pool. It hands out the lock in
//!   ticket order, so a hart hammering the pool cannot starve the others.
//! - [`Rendezvous`] is the exit barrier: an atomic countdown every hart
//!   decrements before spinning until it reaches zero.
//! - [`SyncOnceCell`] publishes a value exactly once (the shutdown record).

#![cfg_attr(not(any(test, doctest)), no_std)]
#![allow(unsafe_code)]

mod rendezvous;
mod spin_lock;
mod sync_once_cell;

pub use rendezvous::Rendezvous;
pub use spin_lock::{SpinLock, SpinLockGuard};
pub use sync_once_cell::SyncOnceCell;
