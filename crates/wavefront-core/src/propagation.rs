//! Finite-speed command propagation ("broadcast wave").
//!
//! A command becomes visible at a position only once a circle centred on its
//! origin, growing at `wave_speed` units per millisecond since issue, strictly
//! contains that position. The radius only grows, so once a command is
//! received at a fixed position it stays received.
//!
//! ```
//! use wavefront_core::action::{Message, Order};
//! use wavefront_core::propagation::received_commands;
//! use glam::Vec2;
//!
//! let message = Message {
//!     order: Order::Move { position: Vec2::ZERO },
//!     timestamp: 1000.0,
//!     origin: Vec2::ZERO,
//! };
//! let observer = Vec2::new(50.0, 0.0);
//!
//! // 0.1 units/ms: the wave covers 50 units after 500 ms.
//! assert!(received_commands(&[message], observer, 1400.0, 0.1).is_empty());
//! assert_eq!(received_commands(&[message], observer, 1600.0, 0.1).len(), 1);
//! ```

use std::collections::VecDeque;

use glam::Vec2;

use crate::action::{Broadcast, Message, Order};

/// Radius of a command's wave at time `now`. Zero before issue.
#[must_use]
pub fn wave_radius<B: Broadcast + ?Sized>(command: &B, now: f64, wave_speed: f64) -> f64 {
    ((now - command.issued_at()) * wave_speed).max(0.0)
}

/// Returns true if the command's wave strictly contains `position` at `now`.
#[must_use]
pub fn wave_contains<B: Broadcast + ?Sized>(
    command: &B,
    position: Vec2,
    now: f64,
    wave_speed: f64,
) -> bool {
    let radius = wave_radius(command, now, wave_speed);
    if radius <= 0.0 {
        return false;
    }
    let distance = f64::from(command.origin().distance(position));
    distance < radius
}

/// The commands whose wave has reached `position`, in input order.
#[must_use]
pub fn received_commands<B: Broadcast>(
    commands: &[B],
    position: Vec2,
    now: f64,
    wave_speed: f64,
) -> Vec<&B> {
    commands
        .iter()
        .filter(|command| wave_contains(*command, position, now, wave_speed))
        .collect()
}

/// Moves every message whose wave has reached `position` from `incoming` to
/// the back of `waypoints`.
///
/// Both queues keep their relative order. Returns the number promoted.
pub fn promote_arrived(
    incoming: &mut VecDeque<Message>,
    waypoints: &mut VecDeque<Order>,
    position: Vec2,
    now: f64,
    wave_speed: f64,
) -> usize {
    let mut promoted = 0;
    let mut pending = VecDeque::with_capacity(incoming.len());

    for message in incoming.drain(..) {
        if wave_contains(&message, position, now, wave_speed) {
            waypoints.push_back(message.order);
            promoted += 1;
        } else {
            pending.push_back(message);
        }
    }

    *incoming = pending;
    promoted
}
