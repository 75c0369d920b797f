//! # Services
//!
//! Application operations behind the HTTP routes. Each takes the database
//! and, where it acts for someone, the [`Principal`](carhire_core::Principal)
//! explicitly; none reads request state.
//!
//! - [`identity`] - Registration, login, bootstrap admin
//! - [`catalog`] - Car and car model management
//! - [`booking`] - Rent, cancel, complete, my rentals
//! - [`search`] - Search, featured models, user dashboard
//! - [`admin`] - Admin dashboard

pub mod admin;
pub mod booking;
pub mod catalog;
pub mod identity;
pub mod search;
