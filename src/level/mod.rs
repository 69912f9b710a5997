use std::{collections::HashMap, fs::File, io::BufReader, path::PathBuf, str::FromStr};

use eyre::{bail, ensure, ContextCompat, WrapErr};
use serde::{Deserialize, Serialize};

use crate::circuit::beam::Beam;
use crate::circuit::sparty::Sparty;
use crate::circuit::{GateId, GateKind};
use crate::common::Point;
use crate::graph::CircuitGraph;
use crate::scene::product::{Product, Property};
use crate::scene::sensor::{parse_properties, SENSOR_PANEL_ORIGIN};
use crate::scene::{ProductId, Scene};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LevelDesc {
    pub width: f64,
    pub height: f64,
    pub items: Vec<ItemDesc>,
    #[serde(default)]
    pub wires: Vec<WireDesc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ItemDesc {
    Conveyor(ConveyorDesc),
    Beam(BeamDesc),
    Sparty(SpartyDesc),
    Sensor(SensorDesc),
    Gate(GateDesc),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ConveyorDesc {
    pub x: f64,
    pub y: f64,
    pub height: f64,
    pub speed: f64,
    // (x, y) of the panel relative to the conveyor
    #[serde(default)]
    pub panel: (f64, f64),
    #[serde(default)]
    pub products: Vec<ProductDesc>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ProductDesc {
    // absolute, or "+N" relative to the previous product
    #[serde(default = "default_placement")]
    pub placement: String,
    pub shape: String,
    pub color: String,
    pub content: Option<String>,
    #[serde(default = "default_kick")]
    pub kick: String,
}

fn default_placement() -> String {
    "0".to_owned()
}

fn default_kick() -> String {
    "no".to_owned()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BeamDesc {
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub sender: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SpartyDesc {
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub height: f64,
    #[serde(rename = "kick-speed", default)]
    pub kick_speed: f64,
    #[serde(rename = "kick-duration", default)]
    pub kick_duration: f64,
    pub pin: (f64, f64),
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SensorDesc {
    // gates are named "<name>.<property>"
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
    pub panel: Option<(f64, f64)>,
    pub properties: Vec<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogicGateDesc {
    And,
    Or,
    Not,
    Sr,
    D,
}

impl From<LogicGateDesc> for GateKind {
    fn from(value: LogicGateDesc) -> Self {
        match value {
            LogicGateDesc::And => GateKind::And,
            LogicGateDesc::Or => GateKind::Or,
            LogicGateDesc::Not => GateKind::Not,
            LogicGateDesc::Sr => GateKind::SrFlipFlop,
            LogicGateDesc::D => GateKind::DFlipFlop,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GateDesc {
    pub name: Option<String>,
    pub kind: LogicGateDesc,
    pub x: f64,
    pub y: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct WireDesc {
    pub from: String,
    #[serde(default)]
    pub output: usize,
    pub to: String,
    #[serde(default)]
    pub input: usize,
}

pub fn parse_placement(text: &str, previous: f64) -> eyre::Result<f64> {
    let text = text.trim();
    let (relative, number) = match text.strip_prefix('+') {
        Some(rest) => (true, rest),
        None => (false, text),
    };

    let value = number
        .parse::<f64>()
        .wrap_err_with(|| format!("invalid product placement: {text:?}"))?;

    Ok(if relative { previous + value } else { value })
}

fn parse_property(name: &str) -> eyre::Result<Property> {
    Property::from_str(name).wrap_err_with(|| format!("unknown product property: {name:?}"))
}

fn parse_kick(text: &str) -> eyre::Result<bool> {
    match text {
        "yes" => Ok(true),
        "no" => Ok(false),
        _ => bail!("kick must be \"yes\" or \"no\", got {text:?}"),
    }
}

impl LevelDesc {
    pub fn load(path: &PathBuf) -> eyre::Result<LevelDesc> {
        let file = File::open(path).wrap_err_with(|| format!("cannot open level {path:?}"))?;
        let level = serde_json::from_reader(BufReader::new(file))
            .wrap_err_with(|| format!("malformed level {path:?}"))?;

        tracing::info!("level loaded: {path:?}");
        Ok(level)
    }

    pub fn to_scene(&self) -> eyre::Result<Scene> {
        let mut scene = Scene::new(self.width, self.height);
        let mut names: HashMap<String, GateId> = HashMap::new();

        let mut register = |name: &Option<String>, gate: GateId| -> eyre::Result<()> {
            let Some(name) = name else {
                return Ok(());
            };
            ensure!(
                names.insert(name.clone(), gate).is_none(),
                "duplicate item name: {name:?}"
            );
            Ok(())
        };

        for item in &self.items {
            match item {
                ItemDesc::Conveyor(desc) => {
                    let conveyor = scene.add_conveyor(
                        Point(desc.x, desc.y),
                        desc.height,
                        desc.speed,
                        Point(desc.panel.0, desc.panel.1),
                    );

                    let mut previous = 0.;
                    for product in &desc.products {
                        let placement = parse_placement(&product.placement, previous)?;
                        previous = placement;

                        let content = match &product.content {
                            Some(name) => parse_property(name)?,
                            None => Property::None,
                        };
                        let mut item = Product::new(
                            ProductId::default(),
                            parse_property(&product.color)?,
                            parse_property(&product.shape)?,
                            content,
                        );
                        item.should_kick = parse_kick(&product.kick)?;

                        scene.add_product(conveyor, placement, item);
                    }
                }
                ItemDesc::Beam(desc) => {
                    let gate = scene.add_gate(
                        GateKind::Beam(Beam::new(desc.sender)),
                        Point(desc.x, desc.y),
                    );
                    register(&desc.name, gate)?;
                }
                ItemDesc::Sparty(desc) => {
                    let sparty = Sparty::new(
                        desc.height,
                        desc.kick_speed,
                        desc.kick_duration,
                        Point(desc.pin.0, desc.pin.1),
                    );
                    let gate = scene.add_gate(GateKind::Sparty(sparty), Point(desc.x, desc.y));
                    register(&desc.name, gate)?;
                }
                ItemDesc::Sensor(desc) => {
                    let properties = parse_properties(&desc.properties)?;
                    let panel = desc
                        .panel
                        .map(|(x, y)| Point(x, y))
                        .unwrap_or(SENSOR_PANEL_ORIGIN);
                    let sensor = scene.add_sensor(Point(desc.x, desc.y), panel, &properties);

                    let gates = scene.sensors()[sensor.0].gates.clone();
                    for (gate, property) in gates.into_iter().zip(properties) {
                        let name = desc.name.as_ref().map(|name| format!("{name}.{property}"));
                        register(&name, gate)?;
                    }
                }
                ItemDesc::Gate(desc) => {
                    let gate = scene.add_gate(desc.kind.into(), Point(desc.x, desc.y));
                    register(&desc.name, gate)?;
                }
            }
        }

        for wire in &self.wires {
            let from = *names
                .get(&wire.from)
                .context(format!("unknown wire source: {:?}", wire.from))?;
            let to = *names
                .get(&wire.to)
                .context(format!("unknown wire target: {:?}", wire.to))?;

            let output = *scene.circuit[from].outputs().get(wire.output).context(format!(
                "{} has no output {}",
                wire.from, wire.output
            ))?;
            let input = *scene.circuit[to]
                .inputs()
                .get(wire.input)
                .context(format!("{} has no input {}", wire.to, wire.input))?;

            scene.circuit.connect(output, input);
        }

        if CircuitGraph::from(&scene.circuit).has_feedback() {
            tracing::warn!("level wiring has a feedback loop, it lags one tick per pass");
        }

        Ok(scene)
    }
}

impl FromStr for LevelDesc {
    type Err = eyre::Report;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).wrap_err("malformed level")
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{parse_placement, LevelDesc};
    use crate::logic::Signal;
    use crate::scene::product::Property;

    const LEVEL: &str = r#"{
        "width": 1150,
        "height": 800,
        "items": [
            {
                "type": "conveyor", "x": 150, "y": 400, "height": 800, "speed": 100,
                "panel": [90, -300],
                "products": [
                    {"placement": "100", "shape": "square", "color": "red"},
                    {"placement": "+200", "shape": "circle", "color": "green", "content": "izzo", "kick": "yes"}
                ]
            },
            {"type": "beam", "name": "beam", "x": 100, "y": 500, "sender": 150},
            {"type": "sensor", "name": "sensor", "x": 300, "y": 400, "properties": ["green", "circle"]},
            {"type": "gate", "name": "and", "kind": "and", "x": 600, "y": 500},
            {"type": "gate", "name": "latch", "kind": "d", "x": 700, "y": 500}
        ],
        "wires": [
            {"from": "sensor.green", "to": "and", "input": 0},
            {"from": "beam", "to": "and", "input": 1},
            {"from": "and", "to": "latch", "input": 1}
        ]
    }"#;

    fn with_wire(wire: &str) -> String {
        LEVEL.replace(r#"{"from": "and", "to": "latch", "input": 1}"#, wire)
    }

    #[test]
    fn unittest_level_placement() -> eyre::Result<()> {
        assert_eq!(parse_placement("250", 100.)?, 250.);
        assert_eq!(parse_placement("+250", 100.)?, 350.);
        assert!(parse_placement("+", 0.).is_err());
        assert!(parse_placement("far", 0.).is_err());

        Ok(())
    }

    #[test]
    fn unittest_level_to_scene() -> eyre::Result<()> {
        let level = LevelDesc::from_str(LEVEL)?;
        let scene = level.to_scene()?;

        let products = scene.products();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].placement, 300.);
        assert_eq!(products[1].content, Property::Izzo);
        assert!(products[1].should_kick && products[1].last);
        assert!(!products[0].should_kick && !products[0].last);

        assert_eq!(scene.sensors()[0].gates.len(), 2);
        assert_eq!(scene.circuit.wires().count(), 3);

        let and = scene
            .circuit
            .gates()
            .iter()
            .find(|gate| gate.kind.name() == "AND")
            .map(|gate| gate.id);
        let and = and.ok_or_else(|| eyre::eyre!("and gate missing"))?;
        let source = scene
            .circuit
            .input_pin(scene.circuit[and].inputs()[0])
            .and_then(|pin| pin.source())
            .and_then(|pin| scene.circuit.output_pin(pin))
            .map(|pin| pin.gate);
        assert_eq!(source, Some(scene.sensors()[0].gates[0]));
        assert_eq!(scene.circuit[and].state(), Signal::Unknown);

        Ok(())
    }

    #[test]
    fn unittest_level_errors() {
        let bad_property = LEVEL.replace("\"circle\", \"color\"", "\"hexagon\", \"color\"");
        assert!(LevelDesc::from_str(&bad_property)
            .and_then(|level| level.to_scene())
            .is_err());

        let bad_kick = LEVEL.replace("\"kick\": \"yes\"", "\"kick\": \"maybe\"");
        assert!(LevelDesc::from_str(&bad_kick)
            .and_then(|level| level.to_scene())
            .is_err());

        for wire in [
            r#"{"from": "nowhere", "to": "latch"}"#,
            r#"{"from": "and", "to": "latch", "input": 2}"#,
            r#"{"from": "and", "output": 1, "to": "latch"}"#,
        ] {
            let level = with_wire(wire);
            assert!(
                LevelDesc::from_str(&level)
                    .and_then(|level| level.to_scene())
                    .is_err(),
                "{wire}"
            );
        }

        let duplicate = LEVEL.replace("\"name\": \"latch\"", "\"name\": \"and\"");
        assert!(LevelDesc::from_str(&duplicate)
            .and_then(|level| level.to_scene())
            .is_err());

        assert!(LevelDesc::from_str("{\"width\": 1}").is_err());
    }
}
