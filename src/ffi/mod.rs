// Copyright 2024-2026 blas-workspace Contributors
// SPDX-License-Identifier: Apache-2.0

//! C Foreign Function Interface for blas-workspace.
//!
//! Every entry point validates its pointers, returns a [`BlasWsStatus`] and
//! records a detail message retrievable with [`blasws_get_last_error`].
//! Panics never cross the boundary.
//!
//! # Safety
//!
//! Handles are single-owner: a handle must not be used from two threads at
//! once, and must not be used after [`blasws_destroy_handle`].

mod error;
mod handle;
mod memory;

pub use error::{
    blasws_clear_last_error, blasws_get_last_error, blasws_status_to_string, BlasWsStatus,
};
pub use handle::{blasws_create_handle, blasws_destroy_handle, BlasWsHandle};
pub use memory::{
    blasws_get_device_memory_size, blasws_is_device_memory_size_query,
    blasws_is_managing_device_memory, blasws_request_device_memory_size,
    blasws_set_device_memory_size, blasws_start_device_memory_size_query,
    blasws_stop_device_memory_size_query,
};
