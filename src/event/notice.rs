// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Subscription notices delivered to the publisher.

/// A decoded subscription notice.
///
/// The first byte is the kind (nonzero subscribes, zero unsubscribes). Any
/// following bytes name the topic, which is currently not used for filtering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionNotice<'a> {
    /// A subscriber joined.
    Subscribe {
        /// Topic bytes following the kind byte.
        topic: &'a [u8],
    },
    /// A subscriber left.
    Unsubscribe {
        /// Topic bytes following the kind byte.
        topic: &'a [u8],
    },
}

impl<'a> SubscriptionNotice<'a> {
    /// Parses a raw notice. Returns `None` for an empty message.
    ///
    /// # Examples
    ///
    /// ```
    /// use backplate_bridge::event::SubscriptionNotice;
    ///
    /// assert!(SubscriptionNotice::parse(&[]).is_none());
    /// assert!(SubscriptionNotice::parse(&[1]).unwrap().is_subscribe());
    /// assert!(!SubscriptionNotice::parse(&[0]).unwrap().is_subscribe());
    /// ```
    #[must_use]
    pub fn parse(raw: &'a [u8]) -> Option<Self> {
        let (&kind, topic) = raw.split_first()?;
        if kind == 0 {
            Some(Self::Unsubscribe { topic })
        } else {
            Some(Self::Subscribe { topic })
        }
    }

    /// Returns `true` for a subscribe notice.
    #[must_use]
    pub fn is_subscribe(&self) -> bool {
        matches!(self, Self::Subscribe { .. })
    }

    /// Returns the topic bytes.
    #[must_use]
    pub fn topic(&self) -> &'a [u8] {
        match self {
            Self::Subscribe { topic } | Self::Unsubscribe { topic } => topic,
        }
    }
}
