// Copyright (c) 2025 - Cowboy AI, Inc.

//! Property-Based Tests Module
//!
//! This module contains property-based tests using proptest to verify
//! the algebraic laws of deciders, views and the materialized view.

mod combinator_laws;
mod view_redelivery;
