//! # Image Ingest
//!
//! Accepts an uploaded image, proves it really is one of a small set of
//! raster formats, and writes three WebP derivatives under a single opaque
//! identity:
//!
//! ```text
//! {storage_root}/original/{id}.webp   full resolution, quality 95
//! {storage_root}/large/{id}.webp      width ≤ 1600, quality 90
//! {storage_root}/thumb/{id}.webp      300×300 center crop, quality 85
//! ```
//!
//! The caller gets back a [`ResultDescriptor`](descriptor::ResultDescriptor)
//! with the identity, paths, measured dimensions and source type, or an
//! [`IngestError`](ingest::IngestError) with a stable reason code.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`ingest`] | Validation chain and the [`IngestPipeline`](ingest::IngestPipeline) orchestrator |
//! | [`imaging`] | Decode, crop, resize, encode, probe: the [`ImageCodec`](imaging::ImageCodec) seam |
//! | [`storage`] | Directory layout, create-new writes, the `.htaccess` access guard |
//! | [`identity`] | UUIDv7 upload identities (`img_…`) |
//! | [`descriptor`] | Success descriptor and the serializable response envelope |
//! | [`config`] | `ingest.toml` loading, merging over stock defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Never Trust the Client
//!
//! Filename extension and declared content type are checked, but only as a
//! cheap first filter. The payload's magic bytes decide its format, and a full
//! decode decides whether it is an image at all. Whatever was uploaded, only
//! pixels re-encoded by this crate ever reach disk, so an upload can never
//! smuggle executable content into the storage root.
//!
//! ## Derivatives From the Stored Original
//!
//! `large` and `thumb` are generated by decoding the WebP just written to
//! `original/`, not the raw upload. Every derivative therefore descends from
//! the same persisted artifact.
//!
//! ## Degrade, Don't Fail, on `large`
//!
//! If the large derivative can't be produced, the original is copied into its
//! place and the result says so. A missing thumbnail or original fails the
//! request.
//!
//! ## Stateless Pipeline
//!
//! [`IngestPipeline`](ingest::IngestPipeline) holds only immutable config and a
//! `Sync` codec. Concurrent requests share nothing but the directories, and
//! they never write the same file: identities are unique and writes are
//! create-new.

pub mod config;
pub mod descriptor;
pub mod identity;
pub mod imaging;
pub mod ingest;
pub mod output;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_helpers;
