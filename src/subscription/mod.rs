// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription system for bus events.
//!
//! This module provides the typed subscriber abstraction used by the
//! [`EventManager`](crate::event::EventManager):
//!
//! - [`Subscriber`] - Trait with a single "handle event" operation; plain
//!   closures implement it via a blanket impl
//! - [`SubscriberRegistry`] - Topic-keyed registry that preserves
//!   registration order, which is also dispatch order
//!
//! Subscriptions are typically created through
//! [`EventManager::subscribe`](crate::event::EventManager::subscribe),
//! which also issues the underlying transport subscription the first time
//! a topic is seen.

mod registry;
mod subscriber;

pub use registry::SubscriberRegistry;
pub use subscriber::Subscriber;
