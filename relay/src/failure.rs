use std::time::{Duration, Instant};

use dgr_shared::{VariableTable, SHUTDOWN_KEY};

use crate::error::DgrError;

/// Slave-side timer that declares the master dead when frames stop arriving
pub struct StalenessDetector {
    initial_timeout: Duration,
    staleness_window: Duration,
    last_receive: Option<Instant>,
}

impl StalenessDetector {
    pub fn new(initial_timeout: Duration, staleness_window: Duration) -> Self {
        Self {
            initial_timeout,
            staleness_window,
            last_receive: None,
        }
    }

    /// How long the next receive may block: the initial timeout until a
    /// first frame has arrived, a non-blocking poll afterwards
    pub fn poll_timeout(&self) -> Duration {
        match self.last_receive {
            None => self.initial_timeout,
            Some(_) => Duration::ZERO,
        }
    }

    pub fn record_receive(&mut self) {
        self.last_receive = Some(Instant::now());
    }

    /// Called when a poll came back empty
    pub fn check_silence(&self) -> Result<(), DgrError> {
        let Some(last_receive) = self.last_receive else {
            return Err(DgrError::ReceiveTimeout {
                waited: self.initial_timeout,
                first_receive: true,
            });
        };

        let silence = last_receive.elapsed();
        if silence > self.staleness_window {
            return Err(DgrError::ReceiveTimeout {
                waited: silence,
                first_receive: false,
            });
        }
        Ok(())
    }
}

/// Value a terminating master stores under `SHUTDOWN_KEY`
pub fn poison_pill() -> [u8; 4] {
    1i32.to_ne_bytes()
}

/// Whether `table` carries a truthy `SHUTDOWN_KEY`
pub fn shutdown_requested(table: &VariableTable) -> bool {
    table
        .get_bytes(SHUTDOWN_KEY)
        .is_some_and(|value| value.iter().any(|byte| *byte != 0))
}
