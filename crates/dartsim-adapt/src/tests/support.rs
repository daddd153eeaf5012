//! Scripted simulator doubles for manager and runner tests.

use std::collections::VecDeque;
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread;

use anyhow::{Context, Result, anyhow};
use dartsim_client::{
    ClientError, ConnectionError, Coordinate, Formation, SensorObservations, SensorReading,
    SimulationParameters, SimulationResults, Simulator, Tactic, TeamConfiguration, TeamState,
};

/// What the simulator shows the manager during one period.
#[derive(Debug, Clone)]
pub(super) struct Period {
    pub state: TeamState,
    pub threats: SensorReading,
    pub targets: SensorReading,
}

impl Period {
    pub(super) fn at_altitude(altitude_level: i32, formation: Formation) -> Self {
        Self {
            state: TeamState {
                position: Coordinate::new(0, 0),
                direction_x: 1,
                direction_y: 0,
                config: TeamConfiguration {
                    altitude_level,
                    formation,
                    ..TeamConfiguration::default()
                },
            },
            threats: vec![false; 5],
            targets: vec![false; 5],
        }
    }

    pub(super) fn with_threats(mut self, threats: &[bool]) -> Self {
        self.threats = threats.to_vec();
        self
    }

    pub(super) fn with_targets(mut self, targets: &[bool]) -> Self {
        self.targets = targets.to_vec();
        self
    }
}

/// In-memory [`Simulator`] that replays scripted periods.
pub(super) struct ScriptedSimulator {
    pub params: SimulationParameters,
    pub periods: VecDeque<Period>,
    pub current: Option<Period>,
    pub results: Option<SimulationResults>,
    pub steps: Vec<Vec<Tactic>>,
    pub sensor_cells: Vec<u32>,
    pub connected: bool,
    pub drop_after_steps: Option<usize>,
    pub never_finishes: bool,
}

impl ScriptedSimulator {
    pub(super) fn new(periods: Vec<Period>) -> Self {
        Self {
            params: SimulationParameters::DEFAULT,
            periods: periods.into(),
            current: None,
            results: Some(SimulationResults {
                targets_detected: 2,
                mission_success: true,
                ..SimulationResults::default()
            }),
            steps: Vec::new(),
            sensor_cells: Vec::new(),
            connected: true,
            drop_after_steps: None,
            never_finishes: false,
        }
    }

    fn current(&self) -> Result<&Period, ClientError> {
        self.current.as_ref().ok_or_else(|| {
            ClientError::from(ConnectionError::Closed {
                endpoint: String::from("scripted"),
            })
        })
    }
}

impl Simulator for ScriptedSimulator {
    fn is_connected(&self) -> bool {
        self.connected
    }

    fn finished(&mut self) -> Result<bool, ClientError> {
        Ok(!self.never_finishes && self.periods.is_empty())
    }

    fn state(&mut self) -> Result<TeamState, ClientError> {
        self.current = self.periods.pop_front();
        Ok(self.current()?.state)
    }

    fn read_forward_threat_sensor(&mut self, cells: u32) -> Result<SensorReading, ClientError> {
        self.sensor_cells.push(cells);
        Ok(self.current()?.threats.clone())
    }

    fn read_forward_target_sensor(&mut self, cells: u32) -> Result<SensorReading, ClientError> {
        self.sensor_cells.push(cells);
        Ok(self.current()?.targets.clone())
    }

    fn read_forward_threat_sensor_for_observations(
        &mut self,
        _cells: u32,
        _observations: u32,
    ) -> Result<SensorObservations, ClientError> {
        Ok(vec![self.current()?.threats.clone()])
    }

    fn read_forward_target_sensor_for_observations(
        &mut self,
        _cells: u32,
        _observations: u32,
    ) -> Result<SensorObservations, ClientError> {
        Ok(vec![self.current()?.targets.clone()])
    }

    fn step<I>(&mut self, tactics: I, decision_time_ms: f64) -> Result<bool, ClientError>
    where
        I: IntoIterator<Item = Tactic>,
    {
        assert!(decision_time_ms >= 0.0, "negative decision time");
        self.steps.push(tactics.into_iter().collect());
        if self.drop_after_steps == Some(self.steps.len()) {
            self.connected = false;
        }
        Ok(true)
    }

    fn results(&mut self) -> Result<Option<SimulationResults>, ClientError> {
        Ok(self.results)
    }

    fn screen_output(&mut self) -> Result<String, ClientError> {
        Ok(String::from("==^==\n"))
    }

    fn parameters(&mut self) -> Result<SimulationParameters, ClientError> {
        Ok(self.params)
    }
}

/// One-connection TCP simulator that answers requests from a fixed list.
pub(super) struct CannedSimulator {
    port: u16,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<thread::JoinHandle<Result<()>>>,
}

impl CannedSimulator {
    pub(super) fn spawn(replies: Vec<&'static str>) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", 0)).context("bind canned simulator")?;
        let port = listener.local_addr().context("local addr")?.port();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        let handle = thread::spawn(move || -> Result<()> {
            let (stream, _) = listener.accept().context("accept client")?;
            let mut reader = BufReader::new(stream.try_clone().context("clone stream")?);
            let mut writer = stream;
            for reply in replies {
                let mut line = String::new();
                if reader.read_line(&mut line).context("read request")? == 0 {
                    break;
                }
                recorded
                    .lock()
                    .map_err(|error| anyhow!("lock requests: {error}"))?
                    .push(line.trim_end().to_owned());
                writeln!(writer, "{reply}").context("write reply")?;
            }
            Ok(())
        });
        Ok(Self {
            port,
            requests,
            handle: Some(handle),
        })
    }

    pub(super) const fn port(&self) -> u16 {
        self.port
    }

    /// Waits for the client to finish and returns the recorded requests.
    pub(super) fn take_requests(&mut self) -> Result<Vec<String>> {
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_| anyhow!("canned simulator thread panicked"))??;
        }
        let requests = self
            .requests
            .lock()
            .map_err(|error| anyhow!("lock requests: {error}"))?;
        Ok(requests.clone())
    }
}
