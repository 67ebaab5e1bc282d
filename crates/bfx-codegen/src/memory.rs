use std::collections::HashMap;

use tracing::trace;

use crate::types::Type;

/// Index of a cell on the tape.
pub type Address = usize;

/// What a cell currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Content {
    #[default]
    Empty,
    Named,
    Temp,
    /// Cells 2..N of a multi-cell value, owned by the value's first cell.
    Referenced,
    /// Backed up on the protect stack; may not be cleared until restored.
    Protected,
}

#[derive(Debug, Clone, Default)]
struct Cell {
    identifier: String,
    scope: String,
    content: Content,
    ty: Type,
}

impl Cell {
    fn clear(&mut self) {
        assert!(
            self.content != Content::Protected,
            "tried to clear a protected cell"
        );
        *self = Cell::default();
    }

    fn is_empty(&self) -> bool {
        self.content == Content::Empty
    }

    /// Heads own a value; `Referenced` followers never match a free.
    fn is_head(&self) -> bool {
        !matches!(self.content, Content::Empty | Content::Referenced)
    }
}

/// Scoped allocator over a growable tape of cells.
///
/// Allocation is first-fit; when no contiguous run of empty cells is large
/// enough the tape is extended by exactly the requested size. The tape never
/// shrinks.
#[derive(Debug, Default)]
pub struct Memory {
    cells: Vec<Cell>,
    /// Saved cell states, keyed by address, restored in LIFO order.
    backups: HashMap<Address, Vec<Cell>>,
    protect_stack: Vec<Address>,
}

impl Memory {
    pub fn new(size: usize) -> Self {
        Self {
            cells: vec![Cell::default(); size],
            backups: HashMap::new(),
            protect_stack: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn find_free(&mut self, size: usize) -> Address {
        assert!(size > 0, "cannot allocate a value of size 0");
        loop {
            if self.cells.len() >= size {
                let found = (0..=self.cells.len() - size)
                    .find(|&start| self.cells[start..start + size].iter().all(Cell::is_empty));
                if let Some(start) = found {
                    return start;
                }
            }

            let new_len = self.cells.len() + size;
            trace!(from = self.cells.len(), to = new_len, "growing tape");
            self.cells.resize(new_len, Cell::default());
        }
    }

    /// Claim a run of cells for `ty` under `identifier` in `scope`.
    ///
    /// Returns `None` when a non-empty `identifier` already exists in exactly
    /// this scope.
    pub fn allocate(&mut self, identifier: &str, scope: &str, ty: Type) -> Option<Address> {
        assert!(!ty.is_null(), "trying to allocate undefined type");

        if !identifier.is_empty() && self.find_local(identifier, scope).is_some() {
            return None;
        }

        let addr = self.find_free(ty.size());
        trace!(addr, identifier, scope, size = ty.size(), "allocate");
        self.place(identifier, scope, ty, addr);
        Some(addr)
    }

    /// Allocate an unnamed temporary. Always succeeds.
    pub fn get_temp(&mut self, scope: &str, ty: Type) -> Address {
        let addr = self.find_free(ty.size());
        self.place("", scope, ty, addr);
        addr
    }

    fn place(&mut self, identifier: &str, scope: &str, ty: Type, addr: Address) {
        self.layout(&ty, addr);

        let cell = &mut self.cells[addr];
        cell.identifier = identifier.to_string();
        cell.scope = scope.to_string();
        cell.content = if identifier.is_empty() {
            Content::Temp
        } else {
            Content::Named
        };
        cell.ty = ty;
    }

    /// Mark every cell of a value as a typed continuation of its owner.
    fn layout(&mut self, ty: &Type, addr: Address) {
        match ty {
            Type::Null => {}
            Type::Int(n) => {
                for cell in &mut self.cells[addr..addr + *n] {
                    *cell = Cell {
                        content: Content::Referenced,
                        ty: Type::Int(1),
                        ..Cell::default()
                    };
                }
                self.cells[addr].ty = ty.clone();
            }
            Type::Struct(def) => {
                for field in def.fields() {
                    self.layout(&field.ty, addr + field.offset);
                }
            }
        }
    }

    /// Resolve a name: a cell in exactly `scope` hides a global one.
    pub fn find(&self, identifier: &str, scope: &str) -> Option<Address> {
        self.find_local(identifier, scope).or_else(|| {
            if scope.is_empty() {
                None
            } else {
                self.find_local(identifier, "")
            }
        })
    }

    pub fn find_local(&self, identifier: &str, scope: &str) -> Option<Address> {
        if identifier.is_empty() {
            return None;
        }
        self.cells
            .iter()
            .position(|c| c.is_head() && c.identifier == identifier && c.scope == scope)
    }

    fn cell(&self, addr: Address) -> &Cell {
        assert!(addr < self.cells.len(), "address {} out of bounds", addr);
        &self.cells[addr]
    }

    fn cell_mut(&mut self, addr: Address) -> &mut Cell {
        assert!(addr < self.cells.len(), "address {} out of bounds", addr);
        &mut self.cells[addr]
    }

    pub fn size_of(&self, addr: Address) -> usize {
        let cell = self.cell(addr);
        assert!(!cell.is_empty(), "requested size of empty address {}", addr);
        cell.ty.size()
    }

    pub fn type_of(&self, addr: Address) -> Type {
        self.cell(addr).ty.clone()
    }

    pub fn content(&self, addr: Address) -> Content {
        self.cell(addr).content
    }

    pub fn scope(&self, addr: Address) -> &str {
        &self.cell(addr).scope
    }

    pub fn is_temp(&self, addr: Address) -> bool {
        self.cell(addr).content == Content::Temp
    }

    /// Back up a cell and protect it from being freed.
    pub fn push(&mut self, addr: Address) {
        let saved = self.cell(addr).clone();
        trace!(addr, "protect");
        self.backups.entry(addr).or_default().push(saved);
        self.cell_mut(addr).content = Content::Protected;
        self.protect_stack.push(addr);
    }

    /// Restore the most recently protected cell and return its address.
    pub fn pop(&mut self) -> Address {
        let addr = self
            .protect_stack
            .pop()
            .expect("pop called with an empty protect stack");
        let backups = self
            .backups
            .get_mut(&addr)
            .expect("restore called on non-backed-up cell");
        let saved = backups.pop().expect("restore called on non-backed-up cell");
        if backups.is_empty() {
            self.backups.remove(&addr);
        }
        trace!(addr, "restore");
        self.cells[addr] = saved;
        addr
    }

    pub fn protected_depth(&self) -> usize {
        self.protect_stack.len()
    }

    pub fn free_temps(&mut self, scope: &str) {
        self.free_if(|cell| cell.content == Content::Temp && cell.scope == scope);
    }

    pub fn free_locals(&mut self, scope: &str) {
        self.free_if(|cell| cell.is_head() && cell.scope == scope);
    }

    fn free_if(&mut self, pred: impl Fn(&Cell) -> bool) {
        for idx in 0..self.cells.len() {
            if !pred(&self.cells[idx]) {
                continue;
            }
            let size = self.cells[idx].ty.size();
            for cell in &mut self.cells[idx + 1..idx + size.max(1)] {
                cell.clear();
            }
            self.cells[idx].clear();
        }
    }

    pub fn mark_as_temp(&mut self, addr: Address) {
        let cell = self.cell_mut(addr);
        assert!(
            cell.content != Content::Protected,
            "calling mark_as_temp on protected cell"
        );
        cell.identifier.clear();
        cell.content = Content::Temp;
    }

    pub fn rename(&mut self, addr: Address, identifier: &str, scope: &str) {
        let cell = self.cell_mut(addr);
        cell.identifier = identifier.to_string();
        cell.scope = scope.to_string();
        if cell.content != Content::Protected {
            cell.content = Content::Named;
        }
    }

    /// Named values registered in exactly `scope`, in tape order.
    pub fn named(&self, scope: &str) -> Vec<(String, Address)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.content == Content::Named && c.scope == scope)
            .map(|(addr, c)| (c.identifier.clone(), addr))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TypeCatalog;

    #[test]
    fn first_fit_grows_by_exact_size() {
        let mut mem = Memory::new(0);
        assert_eq!(mem.allocate("a", "f", Type::Int(1)), Some(0));
        assert_eq!(mem.len(), 1);
        assert_eq!(mem.allocate("b", "f", Type::Int(3)), Some(1));
        assert_eq!(mem.len(), 4);
    }

    #[test]
    fn redefinition_in_same_scope_fails() {
        let mut mem = Memory::new(8);
        assert!(mem.allocate("x", "main", Type::Int(1)).is_some());
        assert!(mem.allocate("x", "main", Type::Int(1)).is_none());
        assert!(mem.allocate("x", "other", Type::Int(1)).is_some());
    }

    #[test]
    fn free_locals_allows_reuse_of_name() {
        let mut mem = Memory::new(4);
        let first = mem.allocate("x", "f", Type::Int(2)).unwrap();
        mem.free_locals("f");
        assert_eq!(mem.find("x", "f"), None);
        let second = mem.allocate("x", "f", Type::Int(2)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn temps_are_freed_per_scope() {
        let mut mem = Memory::new(0);
        let named = mem.allocate("keep", "f", Type::Int(1)).unwrap();
        let t1 = mem.get_temp("f", Type::Int(2));
        let t2 = mem.get_temp("g", Type::Int(1));
        mem.free_temps("f");
        assert_eq!(mem.content(t1), Content::Empty);
        assert_eq!(mem.content(t1 + 1), Content::Empty);
        assert!(mem.is_temp(t2));
        assert_eq!(mem.content(named), Content::Named);
        assert_eq!(mem.get_temp("f", Type::Int(1)), t1);
    }

    #[test]
    fn local_hides_global() {
        let mut mem = Memory::new(0);
        let global = mem.allocate("x", "", Type::Int(1)).unwrap();
        assert_eq!(mem.find("x", "f"), Some(global));
        let local = mem.allocate("x", "f", Type::Int(1)).unwrap();
        assert_eq!(mem.find("x", "f"), Some(local));
        assert_eq!(mem.find("x", ""), Some(global));
        assert_eq!(mem.find("x", "g"), Some(global));
    }

    #[test]
    fn unrelated_scope_is_invisible() {
        let mut mem = Memory::new(0);
        mem.allocate("y", "g", Type::Int(1));
        assert_eq!(mem.find("y", "f"), None);
        assert_eq!(mem.find("y", "gg"), None);
    }

    #[test]
    fn protected_cells_survive_free_temps() {
        let mut mem = Memory::new(0);
        let t = mem.get_temp("f", Type::Int(1));
        mem.push(t);
        mem.free_temps("f");
        assert_eq!(mem.content(t), Content::Protected);
        assert_eq!(mem.pop(), t);
        assert!(mem.is_temp(t));
        mem.free_temps("f");
        assert_eq!(mem.content(t), Content::Empty);
    }

    #[test]
    fn protect_stack_is_lifo() {
        let mut mem = Memory::new(0);
        let a = mem.get_temp("f", Type::Int(1));
        let b = mem.get_temp("f", Type::Int(1));
        mem.push(a);
        mem.push(b);
        assert_eq!(mem.protected_depth(), 2);
        assert_eq!(mem.pop(), b);
        assert_eq!(mem.pop(), a);
    }

    #[test]
    fn restored_cells_drop_their_backups() {
        let mut mem = Memory::new(0);
        let a = mem.get_temp("f", Type::Int(1));
        mem.push(a);
        mem.push(a);
        assert_eq!(mem.backups[&a].len(), 2);
        mem.pop();
        assert_eq!(mem.backups[&a].len(), 1);
        mem.pop();
        assert!(mem.backups.is_empty());
        assert!(mem.is_temp(a));
    }

    #[test]
    #[should_panic(expected = "empty protect stack")]
    fn pop_without_push_panics() {
        Memory::new(1).pop();
    }

    #[test]
    #[should_panic(expected = "protected cell")]
    fn freeing_protected_local_panics() {
        let mut mem = Memory::new(0);
        let x = mem.allocate("x", "f", Type::Int(1)).unwrap();
        mem.push(x);
        mem.free_locals("f");
    }

    #[test]
    fn struct_layout_types_fields() {
        let mut catalog = TypeCatalog::new();
        let inner = catalog.add("In", vec![("a".into(), Type::Int(2))]).unwrap();
        let outer = catalog
            .add("Out", vec![("b".into(), Type::Int(1)), ("i".into(), inner.clone())])
            .unwrap();

        let mut mem = Memory::new(0);
        let p = mem.allocate("p", "main", outer.clone()).unwrap();
        assert_eq!(mem.size_of(p), 3);
        assert_eq!(mem.type_of(p), outer);
        assert_eq!(mem.content(p + 1), Content::Referenced);
        assert_eq!(mem.type_of(p + 1), Type::Int(2));

        mem.free_locals("main");
        assert!((0..3).all(|i| mem.content(p + i) == Content::Empty));
    }

    #[test]
    fn return_value_changes_owner() {
        let mut mem = Memory::new(0);
        let r = mem.allocate("r", "callee", Type::Int(2)).unwrap();
        mem.rename(r, "", "caller");
        mem.mark_as_temp(r);
        mem.free_locals("callee");
        assert!(mem.is_temp(r));
        assert_eq!(mem.scope(r), "caller");
        mem.free_temps("caller");
        assert_eq!(mem.content(r), Content::Empty);
    }

    #[test]
    fn named_lists_scope_members() {
        let mut mem = Memory::new(0);
        mem.allocate("a", "main", Type::Int(1));
        mem.get_temp("main", Type::Int(1));
        mem.allocate("b", "main", Type::Int(1));
        mem.allocate("c", "", Type::Int(1));
        assert_eq!(
            mem.named("main"),
            vec![("a".to_string(), 0), ("b".to_string(), 2)]
        );
    }
}
