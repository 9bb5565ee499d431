//! Delivery sink for replayed packets

use crate::types::Packet;

/// Objects implementing this trait receive packets from a [`Player`](crate::Player)
/// when their frame comes up.
///
/// Delivery happens synchronously inside [`Player::tick`](crate::Player::tick).
/// The player never retries a delivery; failures are the sink's own concern.
pub trait Loopback {
    /// Hand a packet back to the host
    fn deliver(&mut self, packet: Packet);
}

/// Collects delivered packets in order
impl Loopback for Vec<Packet> {
    fn deliver(&mut self, packet: Packet) {
        self.push(packet);
    }
}

impl<L: Loopback + ?Sized> Loopback for &mut L {
    fn deliver(&mut self, packet: Packet) {
        (**self).deliver(packet);
    }
}

impl<L: Loopback + ?Sized> Loopback for Box<L> {
    fn deliver(&mut self, packet: Packet) {
        (**self).deliver(packet);
    }
}
