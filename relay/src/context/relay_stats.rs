/// Running counters of a `DgrContext`'s network activity since its last `init`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Frames broadcast by a master
    pub frames_sent: u64,
    /// Datagrams sent, one per destination per frame
    pub packets_sent: u64,
    pub bytes_sent: u64,
    /// Datagrams drained by a slave
    pub packets_received: u64,
    /// Datagrams drained but superseded by a newer one in the same poll
    pub packets_discarded: u64,
    /// Frames decoded into a slave's table
    pub frames_applied: u64,
}
