//! BIN to ECS Converter Library
//!
//! This library provides the core functionality for converting Intellivision
//! BIN+CFG cartridge images to single-file ECS containers.
//!
// Copyright (c) 2025 Tommy Olsen
// Licensed under the MIT License.

pub mod block;
pub mod catalog;
pub mod config;
pub mod convert_bin;
pub mod ecs_builder;
pub mod error;
pub mod mapper;
pub mod parse_cfg;
pub mod parse_ecs;
pub mod resolver;
pub mod segment;

pub use error::{Error, Result};
