//! The layered "stack" illustration on the landing page and the logic that
//! keeps it in sync with the panel currently being read.

/// Offset from the top of the viewport, in CSS pixels, where the focus band sits.
pub const FOCUS_BAND_OFFSET_PX: f64 = 160.0;

/// Class toggled on the illustration image and sidebar link of the focused layer.
pub const ACTIVE_CLASS: &str = "active";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StackLayer {
    pub id: &'static str,
    pub name: &'static str,
    pub short: Option<&'static str>,
    pub description: &'static str,
    pub link: Option<&'static str>,
    pub z_index: u8,
}

impl StackLayer {
    pub fn image_id(&self) -> String {
        format!("tk-stack-img-{}", self.id)
    }

    pub fn panel_id(&self) -> String {
        format!("tk-lib-{}", self.id)
    }

    pub fn menu_link_id(&self) -> String {
        format!("tk-menu-{}", self.id)
    }

    pub fn css_class(&self) -> String {
        format!("tk-lib-{}", self.id)
    }

    pub fn menu_label(&self) -> &'static str {
        self.short.unwrap_or(self.name)
    }
}

pub const STACK_LAYERS: &[StackLayer] = &[
    StackLayer {
        id: "runtime",
        name: "Runtime",
        short: None,
        description: "Including I/O, timer, filesystem, synchronization, and scheduling facilities, \
                      the runtime is the foundation of asynchronous applications.",
        link: Some("/tokio/tutorial"),
        z_index: 60,
    },
    StackLayer {
        id: "hyper",
        name: "Hyper",
        short: None,
        description: "An HTTP client and server library supporting both the HTTP 1 and 2 protocols.",
        link: Some("https://github.com/hyperium/hyper"),
        z_index: 50,
    },
    StackLayer {
        id: "tonic",
        name: "Tonic",
        short: None,
        description: "A boilerplate-free gRPC client and server library. The easiest way to expose \
                      and consume an API over the network.",
        link: Some("https://github.com/hyperium/tonic"),
        z_index: 40,
    },
    StackLayer {
        id: "tower",
        name: "Tower",
        short: None,
        description: "Modular components for building reliable clients and servers. Includes retry, \
                      load-balancing, filtering, request-limiting facilities, and more.",
        link: Some("https://github.com/tower-rs/tower"),
        z_index: 30,
    },
    StackLayer {
        id: "mio",
        name: "Mio",
        short: None,
        description: "Minimal portable API on top of the operating-system's evented I/O API.",
        link: Some("https://github.com/tokio-rs/mio"),
        z_index: 20,
    },
    StackLayer {
        id: "tracing",
        name: "Tracing",
        short: None,
        description: "Unified insight into the application and libraries. Provides structured, \
                      event-based, data collection and logging.",
        link: Some("https://github.com/tokio-rs/tracing"),
        z_index: 10,
    },
    StackLayer {
        id: "bytes",
        name: "Bytes",
        short: None,
        description: "At the core, networking applications manipulate byte streams. Bytes provides \
                      a rich set of utilities for manipulating byte arrays.",
        link: Some("https://github.com/tokio-rs/bytes"),
        z_index: 0,
    },
];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FocusBand {
    pub offset: f64,
}

impl Default for FocusBand {
    fn default() -> Self {
        Self {
            offset: FOCUS_BAND_OFFSET_PX,
        }
    }
}

/// Viewport-relative vertical extent of a content panel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelBox {
    pub top: f64,
    pub bottom: f64,
}

pub fn in_focus(band: FocusBand, panel: PanelBox) -> bool {
    panel.top <= band.offset && panel.bottom > band.offset
}

/// Index of the first panel inside the focus band. Overlapping panels resolve
/// to the lowest index.
pub fn classify(band: FocusBand, panels: &[PanelBox]) -> Option<usize> {
    panels.iter().position(|panel| in_focus(band, *panel))
}

/// DOM handles for a single layer: its content panel plus the image and menu
/// link that mirror its focus state.
pub trait LayerTarget {
    fn panel_box(&self) -> PanelBox;
    fn set_active(&self, active: bool);
}

struct Entry<T> {
    layer: &'static StackLayer,
    target: T,
    visible: bool,
}

pub struct Highlighter<T> {
    entries: Vec<Entry<T>>,
}

impl<T: LayerTarget> Highlighter<T> {
    /// Layers whose elements cannot be located are left out.
    pub fn new(
        layers: &'static [StackLayer],
        mut locate: impl FnMut(&StackLayer) -> Option<T>,
    ) -> Self {
        let entries = layers
            .iter()
            .filter_map(|layer| {
                locate(layer).map(|target| Entry {
                    layer,
                    target,
                    visible: false,
                })
            })
            .collect();

        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn recompute(&mut self, band: FocusBand) -> Option<&'static StackLayer> {
        let boxes = self
            .entries
            .iter()
            .map(|entry| entry.target.panel_box())
            .collect::<Vec<_>>();
        let focused = classify(band, &boxes);

        for (index, entry) in self.entries.iter_mut().enumerate() {
            let visible = focused == Some(index);
            if visible != entry.visible {
                entry.target.set_active(visible);
                entry.visible = visible;
            }
        }

        focused.map(|index| self.entries[index].layer)
    }
}
