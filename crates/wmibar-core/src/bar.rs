//! The bar context: namespace, hooks, and everything they drive.
//!
//! [`Bar`] owns the namespace and the single mutable state the hooks
//! operate on. All mutation happens on the caller's thread, either inside
//! a namespace hook or inside [`Bar::handle_event`].

use wmibar_types::backend::BarBackend;
use wmibar_types::error::{BarError, Result};
use wmibar_types::font::Font;
use wmibar_types::geometry::{Rect, is_geometry_spec, parse_geometry};
use wmibar_types::input::{MAX_BUTTON, NativeEvent};
use wmibar_vfs::{HookHandler, Namespace, NodeId, normalize};

use crate::config::BarConfig;
use crate::ctl::{self, Command};
use crate::input::{self, Reaction};
use crate::item::{self, ITEM_COLOR_FILES, ITEM_DATA, Item, Style, is_item_name};
use crate::layout;
use crate::render;
use crate::spawn::Spawner;

/// Hook tags attached to namespace nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    /// After-write on `/ctl`.
    Ctl,
    /// Before-read on `/new`.
    New,
    /// Before-read and after-write on `/geometry`.
    Geometry,
    /// After-write on `/<id>/data`.
    Data,
}

/// Global files, in creation order.
pub const GLOBAL_FILES: [&str; 8] = [
    "ctl",
    "new",
    "font",
    "bgcolor",
    "fgcolor",
    "bordercolor",
    "geometry",
    "expandable",
];

#[derive(Debug, Clone, Copy)]
struct Globals {
    new: NodeId,
    font: NodeId,
    fgcolor: NodeId,
    bgcolor: NodeId,
    bordercolor: NodeId,
    expandable: NodeId,
}

/// A running bar.
pub struct Bar<B, S> {
    ns: Namespace<Hook>,
    state: BarState<B, S>,
}

struct BarState<B, S> {
    backend: B,
    spawner: S,
    globals: Globals,
    rect: Rect,
    default_height: u32,
    visible: bool,
    counter: u32,
    shutdown: bool,
    items: Vec<Item>,
}

impl<B: BarBackend, S: Spawner> Bar<B, S> {
    /// Build the global files and size the window.
    ///
    /// `geometry` is an `x,y,width,height` spec; zero or missing width
    /// means full screen width, zero or missing height means
    /// `config.height`. The bar starts unmapped until `display 1`.
    pub fn new(mut backend: B, spawner: S, config: &BarConfig, geometry: Option<&str>) -> Result<Self> {
        let mut ns = Namespace::new();

        let ctl = ns.create("/ctl")?;
        ns.set_after_write(ctl, Hook::Ctl);
        let new = ns.create("/new")?;
        ns.set_before_read(new, Hook::New);
        let font = ns.create_file("/font", config.font.as_bytes())?;
        let bgcolor = ns.create_file("/bgcolor", config.bgcolor.as_bytes())?;
        let fgcolor = ns.create_file("/fgcolor", config.fgcolor.as_bytes())?;
        let bordercolor = ns.create_file("/bordercolor", config.bordercolor.as_bytes())?;
        let geometry_node = ns.create("/geometry")?;
        ns.set_before_read(geometry_node, Hook::Geometry);
        ns.set_after_write(geometry_node, Hook::Geometry);
        let expandable = ns.create("/expandable")?;

        let (screen_w, _) = backend.screen_size();
        let rect = parse_geometry(geometry.unwrap_or(""), screen_w, config.height);
        backend.move_resize(rect)?;
        log::info!("bar geometry {}", rect.to_spec());

        Ok(Self {
            ns,
            state: BarState {
                backend,
                spawner,
                globals: Globals {
                    new,
                    font,
                    fgcolor,
                    bgcolor,
                    bordercolor,
                    expandable,
                },
                rect,
                default_height: config.height,
                visible: false,
                counter: 0,
                shutdown: false,
                items: Vec::new(),
            },
        })
    }

    /// Read a file, running its before-read hook.
    pub fn read(&mut self, path: &str) -> Result<Vec<u8>> {
        self.ns.read(path, &mut self.state)
    }

    /// Replace a file's content, running its after-write hook.
    pub fn write(&mut self, path: &str, data: &[u8]) -> Result<()> {
        self.ns.write(path, data, &mut self.state)
    }

    /// Create an empty file or directory. No hooks are attached.
    pub fn create(&mut self, path: &str) -> Result<()> {
        self.ns.create(path).map(|_| ())
    }

    /// Remove a subtree. The global files cannot be removed.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let path = normalize(path);
        if GLOBAL_FILES.iter().any(|g| path.strip_prefix('/') == Some(*g)) {
            return Err(BarError::Namespace(format!("cannot remove global file: {path}")));
        }
        self.ns.remove(&path)
    }

    pub fn list(&self, path: &str) -> Result<Vec<String>> {
        self.ns.list(path)
    }

    /// Allocate a new item; equivalent to reading `/new`.
    pub fn allocate(&mut self) -> Result<String> {
        self.state.allocate(&mut self.ns)
    }

    /// Execute a control command as if it had been written to `/ctl`.
    pub fn dispatch(&mut self, command: Command) {
        self.state.dispatch(&mut self.ns, command);
    }

    /// Rebuild the item registry and repaint. No-op while hidden.
    pub fn redraw(&mut self) {
        self.state.redraw(&mut self.ns);
    }

    /// React to one native window event.
    pub fn handle_event(&mut self, event: &NativeEvent) {
        match input::route(event, &self.state.items) {
            Reaction::Redraw => self.state.redraw(&mut self.ns),
            Reaction::Press { item, button } => self.state.press(&self.ns, item, button),
            Reaction::Quit => {
                log::info!("window system requested quit");
                self.state.shutdown = true;
            },
            Reaction::Ignore => {},
        }
    }

    pub fn is_shutdown(&self) -> bool {
        self.state.shutdown
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn geometry(&self) -> Rect {
        self.state.rect
    }

    /// Highest item id handed out since startup or the last `reset`.
    pub fn counter(&self) -> u32 {
        self.state.counter
    }

    /// Items as laid out by the last redraw.
    pub fn items(&self) -> &[Item] {
        &self.state.items
    }

    pub fn namespace(&self) -> &Namespace<Hook> {
        &self.ns
    }

    pub fn backend(&self) -> &B {
        &self.state.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.state.backend
    }

    pub fn spawner(&self) -> &S {
        &self.state.spawner
    }
}

impl<B: BarBackend, S: Spawner> BarState<B, S> {
    fn style(&self, ns: &Namespace<Hook>) -> Style {
        let color = |id| self.backend.load_color(ns.text(id).trim());
        Style {
            font: Font::parse(&ns.text(self.globals.font)),
            fg: color(self.globals.fgcolor),
            bg: color(self.globals.bgcolor),
            border: color(self.globals.bordercolor),
        }
    }

    fn redraw(&mut self, ns: &mut Namespace<Hook>) {
        if !self.visible {
            log::trace!("bar hidden, skipping redraw");
            return;
        }
        let style = self.style(ns);
        self.items = item::build(ns, &self.backend, &style);
        let (w, h) = (self.rect.w, self.rect.h);

        let result = if self.items.is_empty() {
            render::draw_empty(&mut self.backend, w, h, &style)
        } else {
            let expandable = {
                let names: Vec<&str> = self.items.iter().map(|i| i.name.as_str()).collect();
                layout::resolve_expandable(&ns.text(self.globals.expandable), self.counter, &names)
            };
            let mode = render::place(&mut self.items, w, h, expandable, &self.backend);
            log::debug!("redraw {} items, {mode:?}", self.items.len());
            render::draw_items(&mut self.backend, &self.items)
        };
        if let Err(e) = result {
            log::warn!("redraw failed: {e}");
        }
    }

    fn allocate(&mut self, ns: &mut Namespace<Hook>) -> Result<String> {
        let id = loop {
            self.counter = self
                .counter
                .checked_add(1)
                .ok_or_else(|| BarError::Namespace("item ids exhausted".to_string()))?;
            let id = self.counter.to_string();
            if !ns.exists(&id) {
                break id;
            }
            log::debug!("item {id} already exists, skipping");
        };

        let dir = format!("/{id}");
        ns.create(&dir)?;
        let data = ns.create(&format!("{dir}/{ITEM_DATA}"))?;
        ns.set_after_write(data, Hook::Data);
        let seeds = [self.globals.fgcolor, self.globals.bgcolor, self.globals.bordercolor];
        for (file, global) in ITEM_COLOR_FILES.into_iter().zip(seeds) {
            let seed = ns.content(global).unwrap_or_default().to_vec();
            ns.create_file(&format!("{dir}/{file}"), &seed)?;
        }
        for button in 1..=MAX_BUTTON {
            ns.create(&format!("{dir}/{}", input::press_file(button)))?;
        }

        ns.set_content(self.globals.new, id.as_bytes());
        log::debug!("allocated item {id}");
        self.redraw(ns);
        Ok(id)
    }

    fn dispatch(&mut self, ns: &mut Namespace<Hook>, command: Command) {
        log::debug!("ctl: {command:?}");
        match command {
            Command::Quit => {
                log::info!("quit requested");
                self.shutdown = true;
            },
            Command::Display(true) => {
                self.visible = true;
                if let Err(e) = self.backend.map_raised() {
                    log::warn!("failed to map bar: {e}");
                }
                self.redraw(ns);
            },
            Command::Display(false) => {
                self.visible = false;
                if let Err(e) = self.backend.unmap() {
                    log::warn!("failed to unmap bar: {e}");
                }
            },
            Command::Update => self.redraw(ns),
            Command::Reset => {
                for id in 1..=self.counter {
                    let path = format!("/{id}");
                    if ns.exists(&path)
                        && let Err(e) = ns.remove(&path)
                    {
                        log::warn!("reset: {e}");
                    }
                }
                self.counter = 0;
                self.redraw(ns);
            },
            Command::Destroy(name) => {
                if !is_item_name(&name) {
                    log::debug!("destroy: {name:?} is not an item");
                    return;
                }
                if let Err(e) = ns.remove(&format!("/{name}")) {
                    log::debug!("destroy: {e}");
                }
                self.redraw(ns);
            },
        }
    }

    fn set_geometry(&mut self, ns: &mut Namespace<Hook>, spec: &str) {
        let (screen_w, _) = self.backend.screen_size();
        self.rect = parse_geometry(spec, screen_w, self.default_height);
        if let Err(e) = self.backend.move_resize(self.rect) {
            log::warn!("failed to resize bar: {e}");
        }
        log::debug!("geometry now {}", self.rect.to_spec());
        self.redraw(ns);
    }

    fn press(&mut self, ns: &Namespace<Hook>, item: usize, button: u8) {
        let Some(root) = self.items.get(item).map(|i| i.root) else {
            return;
        };
        let file = input::press_file(button);
        let Some(node) = ns.children(root).find(|&c| ns.name(c) == Some(file.as_str())) else {
            return;
        };
        let command = ns.text(node);
        let command = command.trim_end();
        if command.is_empty() {
            return;
        }
        log::debug!("button {button} on item {}: {command}", self.items[item].name);
        self.spawner.spawn(command);
    }
}

impl<B: BarBackend, S: Spawner> HookHandler<Hook> for BarState<B, S> {
    fn before_read(&mut self, ns: &mut Namespace<Hook>, node: NodeId, hook: Hook) {
        match hook {
            Hook::New => {
                if let Err(e) = self.allocate(ns) {
                    log::warn!("item allocation failed: {e}");
                }
            },
            Hook::Geometry => ns.set_content(node, self.rect.to_spec().as_bytes()),
            Hook::Ctl | Hook::Data => {},
        }
    }

    fn after_write(&mut self, ns: &mut Namespace<Hook>, node: NodeId, hook: Hook) {
        match hook {
            Hook::Ctl => {
                if let Some(command) = ctl::parse(ns.content(node).unwrap_or_default()) {
                    self.dispatch(ns, command);
                }
            },
            Hook::Geometry => {
                let spec = ns.text(node);
                if is_geometry_spec(&spec) {
                    self.set_geometry(ns, &spec);
                } else {
                    log::debug!("ignoring geometry write {spec:?}");
                }
            },
            Hook::Data => {
                let dir = ns.parent_of(node);
                if self.items.iter().any(|i| Some(i.root) == dir) {
                    self.redraw(ns);
                }
            },
            Hook::New => {},
        }
    }
}
