//! Descriptor State Module
//!
//! The shadow state of one descriptor inside one epoll instance.
//!
//! A `DescriptorState` is built from the event bitset of a successful
//! `EPOLL_CTL_ADD` or `EPOLL_CTL_MOD`. Every later observation (a read, a
//! write, a readiness report) produces an updated copy. A new registration
//! never inherits the activity flags of the previous one.

use crate::interest::Interest;

/// Monitoring and activity flags of one (instance, descriptor) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorState {
    in_monitored: bool,
    out_monitored: bool,
    had_in_ops_after_monitoring: bool,
    had_out_ops_after_monitoring: bool,
    poll_reported_in_event: bool,
    poll_reported_out_event: bool,
    edge_triggered: bool,
    one_shot: bool,
    armed: bool,
}

impl Default for DescriptorState {
    fn default() -> Self {
        Self {
            in_monitored: false,
            out_monitored: false,
            had_in_ops_after_monitoring: false,
            had_out_ops_after_monitoring: false,
            poll_reported_in_event: false,
            poll_reported_out_event: false,
            edge_triggered: false,
            one_shot: false,
            armed: true,
        }
    }
}

impl DescriptorState {
    /// Build the state implied by a registration with `events`
    ///
    /// `EPOLLIN` or `EPOLLPRI` make the descriptor monitored for input,
    /// `EPOLLOUT` for output. All activity flags start cleared.
    pub fn from_events(events: Interest) -> Self {
        Self {
            in_monitored: events.is_readable(),
            out_monitored: events.is_writable(),
            edge_triggered: events.is_edge_triggered(),
            one_shot: events.is_one_shot(),
            ..Self::default()
        }
    }

    pub fn in_monitored(&self) -> bool {
        self.in_monitored
    }

    pub fn out_monitored(&self) -> bool {
        self.out_monitored
    }

    pub fn had_in_ops_after_monitoring(&self) -> bool {
        self.had_in_ops_after_monitoring
    }

    pub fn had_out_ops_after_monitoring(&self) -> bool {
        self.had_out_ops_after_monitoring
    }

    pub fn poll_reported_in_event(&self) -> bool {
        self.poll_reported_in_event
    }

    pub fn poll_reported_out_event(&self) -> bool {
        self.poll_reported_out_event
    }

    pub fn edge_triggered(&self) -> bool {
        self.edge_triggered
    }

    pub fn one_shot(&self) -> bool {
        self.one_shot
    }

    /// False once a one-shot registration has delivered its event
    pub fn armed(&self) -> bool {
        self.armed
    }

    /// Input was consumed (data, end of file or an error)
    #[must_use]
    pub fn with_in_activity(self) -> Self {
        Self {
            had_in_ops_after_monitoring: true,
            ..self
        }
    }

    /// Output was produced (bytes written or an error)
    #[must_use]
    pub fn with_out_activity(self) -> Self {
        Self {
            had_out_ops_after_monitoring: true,
            ..self
        }
    }

    /// `epoll_wait` reported `events` for this descriptor
    ///
    /// Error and hang-up conditions are reported regardless of the
    /// registration and count as readiness in both directions. A one-shot
    /// registration is disarmed by any report.
    #[must_use]
    pub fn with_reported(self, events: Interest) -> Self {
        let failure = events.intersects(Interest::EPOLLERR | Interest::EPOLLHUP);
        Self {
            poll_reported_in_event: self.poll_reported_in_event || events.is_readable() || failure,
            poll_reported_out_event: self.poll_reported_out_event || events.is_writable() || failure,
            armed: self.armed && !self.one_shot,
            ..self
        }
    }

    /// Monitoring for input is dropped while no input was ever consumed
    pub fn loses_undrained_input(&self, next: &DescriptorState) -> bool {
        self.in_monitored && !next.in_monitored && !self.had_in_ops_after_monitoring
    }

    /// Monitoring for output is dropped while nothing was ever written
    pub fn loses_unflushed_output(&self, next: &DescriptorState) -> bool {
        self.out_monitored && !next.out_monitored && !self.had_out_ops_after_monitoring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_events_input_only() {
        let state = DescriptorState::from_events(Interest::EPOLLIN);
        assert!(state.in_monitored());
        assert!(!state.out_monitored());
        assert!(!state.had_in_ops_after_monitoring());
        assert!(!state.had_out_ops_after_monitoring());
        assert!(state.armed());
    }

    #[test]
    fn test_from_events_priority_and_output() {
        let state = DescriptorState::from_events(Interest::EPOLLPRI | Interest::EPOLLOUT);
        assert!(state.in_monitored());
        assert!(state.out_monitored());
    }

    #[test]
    fn test_from_events_neither_direction() {
        let state = DescriptorState::from_events(Interest::EPOLLRDHUP | Interest::EPOLLET);
        assert!(!state.in_monitored());
        assert!(!state.out_monitored());
        assert!(state.edge_triggered());
    }

    #[test]
    fn test_activity_updates_are_copies() {
        let state = DescriptorState::from_events(Interest::EPOLLIN | Interest::EPOLLOUT);
        let read = state.with_in_activity();
        assert!(!state.had_in_ops_after_monitoring());
        assert!(read.had_in_ops_after_monitoring());
        assert!(!read.had_out_ops_after_monitoring());

        let both = read.with_out_activity();
        assert!(both.had_in_ops_after_monitoring());
        assert!(both.had_out_ops_after_monitoring());
    }

    #[test]
    fn test_undrained_input_detection() {
        let armed = DescriptorState::from_events(Interest::EPOLLIN);
        let disarmed = DescriptorState::from_events(Interest::empty());
        assert!(armed.loses_undrained_input(&disarmed));
        assert!(!armed.with_in_activity().loses_undrained_input(&disarmed));
        assert!(!armed.loses_undrained_input(&armed));
        assert!(!armed.loses_unflushed_output(&disarmed));
    }

    #[test]
    fn test_unflushed_output_detection() {
        let armed = DescriptorState::from_events(Interest::EPOLLOUT);
        let input = DescriptorState::from_events(Interest::EPOLLIN);
        assert!(armed.loses_unflushed_output(&input));
        assert!(!armed.with_out_activity().loses_unflushed_output(&input));
    }

    #[test]
    fn test_one_shot_disarmed_by_report() {
        let state = DescriptorState::from_events(Interest::EPOLLIN | Interest::EPOLLONESHOT);
        let reported = state.with_reported(Interest::EPOLLIN);
        assert!(!reported.armed());
        assert!(reported.poll_reported_in_event());
        assert!(!reported.poll_reported_out_event());
    }

    #[test]
    fn test_level_triggered_stays_armed() {
        let state = DescriptorState::from_events(Interest::EPOLLOUT);
        let reported = state.with_reported(Interest::EPOLLOUT);
        assert!(reported.armed());
        assert!(reported.poll_reported_out_event());
    }

    #[test]
    fn test_hangup_reports_both_directions() {
        let state = DescriptorState::from_events(Interest::EPOLLIN);
        let reported = state.with_reported(Interest::EPOLLHUP);
        assert!(reported.poll_reported_in_event());
        assert!(reported.poll_reported_out_event());
    }
}
