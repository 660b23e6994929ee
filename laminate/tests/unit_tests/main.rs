// Copyright (c) The laminate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests for the layered layout engine, built on the `fixtures`
//! crate.

mod support;

mod pipeline_tests;
mod property_tests;
mod routing_tests;
