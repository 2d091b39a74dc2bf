// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for photo capture and poster compositing
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  CapturedPhoto   │
//! │ (YUYV/MJPG)  │     │  - to RGBA        │     │  (PNG data URL)  │
//! │              │     │  - mirror         │     │                  │
//! │              │     │  - PNG encoding   │     │                  │
//! └──────────────┘     └───────────────────┘     └────────┬─────────┘
//!                                                          │
//! ┌──────────────┐     ┌───────────────────┐     ┌────────▼─────────┐
//! │ wanted-      │ ◀── │  Poster export    │ ◀── │  Poster scene    │
//! │ poster.png   │     │  - flatten x1.518 │     │  frame / photo / │
//! │  759x1117    │     │  - name text      │     │  stickers        │
//! └──────────────┘     └───────────────────┘     └──────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Still capture from camera frames
//! - [`poster`]: Layered poster scene, name text and export

pub mod photo;
pub mod poster;
