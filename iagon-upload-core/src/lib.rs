#![doc = "iagon-upload-core: core pipeline for iagon-upload."]

//! This crate holds the data model, the [`contract::StorageClient`] seam and
//! the upload pipeline: file collection, remote directory resolution and
//! bounded-concurrency uploads. The HTTP client for the real gateway lives in
//! the CLI crate.
//!
//! # Usage
//! Build an [`config::UploadConfig`], pick a [`contract::StorageClient`]
//! implementation and call [`synchronise::synchronise`].

pub mod collect;
pub mod config;
pub mod contract;
pub mod error;
pub mod resolve;
pub mod synchronise;
pub mod upload;
