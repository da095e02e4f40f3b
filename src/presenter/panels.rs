//! Fixed chart panel declarations.

/// Which vertical axis a trace is scaled against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    /// Independent scale drawn on the right-hand side of the panel
    Right,
}

/// One trace within a panel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraceSpec {
    /// Signal name inside the sub-record
    pub field: &'static str,
    /// Legend label, with unit
    pub label: &'static str,
    pub axis: AxisSide,
}

/// One chart panel and where its data comes from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSpec {
    pub id: &'static str,
    pub title: &'static str,
    pub board: &'static str,
    /// Message names tried in order; the first present one is used
    pub messages: &'static [&'static str],
    pub index: usize,
    pub traces: &'static [TraceSpec],
}

impl PanelSpec {
    /// Whether any trace uses the right-hand axis
    pub fn has_secondary_axis(&self) -> bool {
        self.traces.iter().any(|t| t.axis == AxisSide::Right)
    }

    /// Dotted source path for display, e.g. `bms.bms_capacity[0]`
    pub fn source_path(&self) -> String {
        format!(
            "{}.{}[{}]",
            self.board,
            self.messages.first().copied().unwrap_or_default(),
            self.index
        )
    }
}

/// The four dashboard panels
pub static PANELS: [PanelSpec; 4] = [
    PanelSpec {
        id: "car_speed",
        title: "Speed",
        board: "dashboard",
        messages: &["car_speed"],
        index: 0,
        traces: &[TraceSpec {
            field: "speed",
            label: "Speed (m/s)",
            axis: AxisSide::Left,
        }],
    },
    PanelSpec {
        id: "bms_module_min_max",
        title: "BMS Module Min/Max",
        board: "bms",
        messages: &["bms_module_min_max"],
        index: 0,
        traces: &[
            TraceSpec {
                field: "module_min_voltage",
                label: "Min Module Voltage (V)",
                axis: AxisSide::Left,
            },
            TraceSpec {
                field: "module_max_voltage",
                label: "Max Module Voltage (V)",
                axis: AxisSide::Left,
            },
            TraceSpec {
                field: "module_min_temp",
                label: "Min Module Temp (DegC)",
                axis: AxisSide::Right,
            },
            TraceSpec {
                field: "module_max_temp",
                label: "Max Module Temp (DegC)",
                axis: AxisSide::Right,
            },
        ],
    },
    PanelSpec {
        id: "bms_measurement",
        title: "BMS Measurement",
        board: "bms",
        // Some signal definitions spell the message "bms_measurment"
        messages: &["bms_measurement", "bms_measurment"],
        index: 0,
        traces: &[
            TraceSpec {
                field: "current",
                label: "Battery Current (A)",
                axis: AxisSide::Left,
            },
            TraceSpec {
                field: "battery_voltage",
                label: "Battery Voltage (V)",
                axis: AxisSide::Right,
            },
        ],
    },
    PanelSpec {
        id: "bms_capacity",
        title: "BMS Capacity",
        board: "bms",
        messages: &["bms_capacity"],
        index: 0,
        traces: &[TraceSpec {
            field: "Wh",
            label: "Battery Capacity (Wh)",
            axis: AxisSide::Left,
        }],
    },
];
