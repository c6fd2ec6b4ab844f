//! Arena-backed file tree with per-node read/write hooks.
//!
//! Nodes live in a slot vector and are addressed by generational [`NodeId`]s,
//! so a handle to a removed node never aliases a node created later in the
//! same slot. Parents own their children through a first-child link and
//! a `next` sibling chain; the parent link is a plain lookup.

use wmibar_types::error::{BarError, Result};

use crate::path::{basename, components, normalize, parent};

/// Handle to a node in a [`Namespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// Receiver of hook invocations.
///
/// The namespace hands itself back to the handler so hooks can create,
/// remove, and rewrite nodes while they run.
pub trait HookHandler<H> {
    /// Called just before the content of `node` is returned to a reader.
    fn before_read(&mut self, ns: &mut Namespace<H>, node: NodeId, hook: H);

    /// Called just after the content of `node` was replaced by a writer.
    fn after_write(&mut self, ns: &mut Namespace<H>, node: NodeId, hook: H);
}

#[derive(Debug)]
struct Node<H> {
    name: String,
    content: Vec<u8>,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    next: Option<NodeId>,
    before_read: Option<H>,
    after_write: Option<H>,
}

#[derive(Debug)]
struct Slot<H> {
    generation: u32,
    node: Option<Node<H>>,
}

/// The file tree. `H` is the hook tag type the owner dispatches on.
#[derive(Debug)]
pub struct Namespace<H> {
    slots: Vec<Slot<H>>,
    free: Vec<u32>,
    root: NodeId,
}

impl<H: Copy> Namespace<H> {
    /// Create a namespace holding only the root directory.
    pub fn new() -> Self {
        let root_node = Node {
            name: String::new(),
            content: Vec::new(),
            parent: None,
            first_child: None,
            next: None,
            before_read: None,
            after_write: None,
        };
        Self {
            slots: vec![Slot {
                generation: 0,
                node: Some(root_node),
            }],
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> Option<&Node<H>> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node<H>> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.node.as_mut()
    }

    fn alloc(&mut self, node: Node<H>) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        let Some(slot) = self.slots.get_mut(id.index as usize) else {
            return;
        };
        if slot.generation == id.generation && slot.node.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }
    }

    /// Whether `id` still refers to a live node.
    pub fn is_live(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Look up the node at `path`.
    ///
    /// The returned node's sibling chain is available through
    /// [`Namespace::siblings`].
    pub fn walk(&self, path: &str) -> Option<NodeId> {
        let path = normalize(path);
        let mut current = self.root;
        for name in components(&path) {
            current = self.children(current).find(|&c| self.name(c) == Some(name))?;
        }
        Some(current)
    }

    /// Whether a node exists at `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.walk(path).is_some()
    }

    /// Create an empty node at `path`.
    ///
    /// Fails if the path already exists or its parent is missing. The new
    /// node is appended to the end of its parent's child chain.
    pub fn create(&mut self, path: &str) -> Result<NodeId> {
        let path = normalize(path);
        if path.as_ref() == "/" {
            return Err(BarError::Namespace("cannot create root".to_string()));
        }
        let par = parent(&path);
        let parent_id = self
            .walk(par)
            .ok_or_else(|| BarError::Namespace(format!("parent does not exist: {par}")))?;
        if self.walk(&path).is_some() {
            return Err(BarError::Namespace(format!("file exists: {path}")));
        }

        let id = self.alloc(Node {
            name: basename(&path).to_string(),
            content: Vec::new(),
            parent: Some(parent_id),
            first_child: None,
            next: None,
            before_read: None,
            after_write: None,
        });

        match self.children(parent_id).last() {
            Some(last) => {
                if let Some(node) = self.node_mut(last) {
                    node.next = Some(id);
                }
            },
            None => {
                if let Some(node) = self.node_mut(parent_id) {
                    node.first_child = Some(id);
                }
            },
        }
        log::trace!("created {path}");
        Ok(id)
    }

    /// Create a node at `path` holding `content`.
    pub fn create_file(&mut self, path: &str, content: &[u8]) -> Result<NodeId> {
        let id = self.create(path)?;
        self.set_content(id, content);
        Ok(id)
    }

    /// Detach the node at `path` from its parent and free its whole subtree.
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let normalized = normalize(path);
        if normalized.as_ref() == "/" {
            return Err(BarError::Namespace("cannot remove root".to_string()));
        }
        let id = self
            .walk(&normalized)
            .ok_or_else(|| BarError::Namespace(format!("no such path: {normalized}")))?;
        self.unlink(id);

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend(self.children(current));
            self.release(current);
        }
        log::trace!("removed {normalized}");
        Ok(())
    }

    /// Splice `id` out of its parent's child chain.
    fn unlink(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else { return };
        let (parent_id, next) = (node.parent, node.next);
        let Some(parent_id) = parent_id else { return };

        let prev = self
            .children(parent_id)
            .take_while(|&c| c != id)
            .last();
        match prev {
            Some(prev) => {
                if let Some(p) = self.node_mut(prev) {
                    p.next = next;
                }
            },
            None => {
                if let Some(p) = self.node_mut(parent_id) {
                    p.first_child = next;
                }
            },
        }
    }

    /// `id` followed by every node in its `next` chain.
    pub fn siblings(&self, id: NodeId) -> Siblings<'_, H> {
        Siblings {
            ns: self,
            current: self.node(id).map(|_| id),
        }
    }

    /// Children of `id` in creation order.
    pub fn children(&self, id: NodeId) -> Siblings<'_, H> {
        Siblings {
            ns: self,
            current: self.node(id).and_then(|n| n.first_child),
        }
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|n| n.parent)
    }

    pub fn content(&self, id: NodeId) -> Option<&[u8]> {
        self.node(id).map(|n| n.content.as_slice())
    }

    /// Content as text, lossily decoded.
    pub fn text(&self, id: NodeId) -> String {
        self.content(id)
            .map(|c| String::from_utf8_lossy(c).into_owned())
            .unwrap_or_default()
    }

    /// Replace the content of `id` without firing hooks.
    pub fn set_content(&mut self, id: NodeId, content: &[u8]) {
        if let Some(node) = self.node_mut(id) {
            node.content.clear();
            node.content.extend_from_slice(content);
        }
    }

    /// Absolute path of `id`.
    pub fn path_of(&self, id: NodeId) -> Option<String> {
        let mut names = Vec::new();
        let mut current = id;
        while current != self.root {
            let node = self.node(current)?;
            names.push(node.name.as_str());
            current = node.parent?;
        }
        names.reverse();
        Some(format!("/{}", names.join("/")))
    }

    pub fn set_before_read(&mut self, id: NodeId, hook: H) {
        if let Some(node) = self.node_mut(id) {
            node.before_read = Some(hook);
        }
    }

    pub fn set_after_write(&mut self, id: NodeId, hook: H) {
        if let Some(node) = self.node_mut(id) {
            node.after_write = Some(hook);
        }
    }

    /// Read `path`, running its before-read hook first.
    pub fn read(&mut self, path: &str, handler: &mut impl HookHandler<H>) -> Result<Vec<u8>> {
        let id = self
            .walk(path)
            .ok_or_else(|| BarError::Namespace(format!("no such file: {}", normalize(path))))?;
        if let Some(hook) = self.node(id).and_then(|n| n.before_read) {
            handler.before_read(self, id, hook);
        }
        self.content(id)
            .map(<[u8]>::to_vec)
            .ok_or_else(|| BarError::Namespace(format!("removed while reading: {}", normalize(path))))
    }

    /// Replace the content of `path`, then run its after-write hook.
    pub fn write(
        &mut self,
        path: &str,
        data: &[u8],
        handler: &mut impl HookHandler<H>,
    ) -> Result<()> {
        let id = self
            .walk(path)
            .ok_or_else(|| BarError::Namespace(format!("no such file: {}", normalize(path))))?;
        self.set_content(id, data);
        if let Some(hook) = self.node(id).and_then(|n| n.after_write) {
            handler.after_write(self, id, hook);
        }
        Ok(())
    }

    /// Names of the children of `path`.
    pub fn list(&self, path: &str) -> Result<Vec<String>> {
        let id = self
            .walk(path)
            .ok_or_else(|| BarError::Namespace(format!("no such path: {}", normalize(path))))?;
        Ok(self
            .children(id)
            .filter_map(|c| self.name(c).map(str::to_string))
            .collect())
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }
}

impl<H: Copy> Default for Namespace<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over a `next` chain.
pub struct Siblings<'a, H> {
    ns: &'a Namespace<H>,
    current: Option<NodeId>,
}

impl<H: Copy> Iterator for Siblings<'_, H> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.ns.node(id).and_then(|n| n.next);
        Some(id)
    }
}
