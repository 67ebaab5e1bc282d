use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Type of a value living on the tape.
#[derive(Debug, Clone, Default)]
pub enum Type {
    /// Undefined; carried by empty cells.
    #[default]
    Null,
    /// Integer of the given width in cells (arrays are wide integers).
    Int(usize),
    /// Struct resolved against the [`TypeCatalog`].
    Struct(Rc<StructDef>),
}

impl Type {
    pub fn size(&self) -> usize {
        match self {
            Type::Null => 0,
            Type::Int(n) => *n,
            Type::Struct(def) => def.size(),
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Type::Null)
    }

    pub fn as_struct(&self) -> Option<&StructDef> {
        match self {
            Type::Struct(def) => Some(def),
            _ => None,
        }
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Null, Type::Null) => true,
            (Type::Int(a), Type::Int(b)) => a == b,
            (Type::Struct(a), Type::Struct(b)) => a.name == b.name,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Null => f.write_str("<null>"),
            Type::Int(1) => f.write_str("int"),
            Type::Int(n) => write!(f, "[{}]", n),
            Type::Struct(def) => f.write_str(&def.name),
        }
    }
}

/// One field of a struct at a fixed offset from the struct's base address.
#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub offset: usize,
    pub ty: Type,
}

/// Flattened struct layout: fields in declaration order, no padding.
#[derive(Debug)]
pub struct StructDef {
    name: String,
    size: usize,
    fields: Vec<Field>,
}

impl StructDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            fields: Vec::new(),
        }
    }

    /// Append a field after the ones already present.
    pub fn add_field(&mut self, name: &str, ty: Type) {
        let offset = self.size;
        self.size += ty.size();
        self.fields.push(Field {
            name: name.to_string(),
            offset,
            ty,
        });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Registry of struct types for one compilation.
#[derive(Debug, Default)]
pub struct TypeCatalog {
    structs: HashMap<String, Rc<StructDef>>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a struct once. Returns `None` if the name is already taken.
    pub fn add(&mut self, name: &str, fields: Vec<(String, Type)>) -> Option<Type> {
        if self.structs.contains_key(name) {
            return None;
        }

        let mut def = StructDef::new(name);
        for (field, ty) in fields {
            def.add_field(&field, ty);
        }

        let def = Rc::new(def);
        self.structs.insert(name.to_string(), Rc::clone(&def));
        Some(Type::Struct(def))
    }

    pub fn lookup(&self, name: &str) -> Option<Type> {
        self.structs.get(name).map(|def| Type::Struct(Rc::clone(def)))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.structs.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn int_sizes() {
        assert_eq!(Type::Int(1).size(), 1);
        assert_eq!(Type::Int(255).size(), 255);
        assert_eq!(Type::Null.size(), 0);
    }

    #[test]
    fn offsets_are_cumulative() {
        let mut catalog = TypeCatalog::new();
        let ty = catalog
            .add(
                "Point",
                vec![("x".to_string(), Type::Int(1)), ("y".to_string(), Type::Int(3))],
            )
            .unwrap();

        assert_eq!(ty.size(), 4);
        let def = ty.as_struct().unwrap();
        assert_eq!(def.field("x").unwrap().offset, 0);
        assert_eq!(def.field("y").unwrap().offset, 1);
        assert!(def.field("z").is_none());
    }

    #[test]
    fn nested_structs_are_flattened() {
        let mut catalog = TypeCatalog::new();
        let inner = catalog
            .add("Inner", vec![("a".to_string(), Type::Int(2))])
            .unwrap();
        let outer = catalog
            .add(
                "Outer",
                vec![
                    ("head".to_string(), Type::Int(1)),
                    ("inner".to_string(), inner),
                    ("tail".to_string(), Type::Int(1)),
                ],
            )
            .unwrap();

        let def = outer.as_struct().unwrap();
        assert_eq!(outer.size(), 4);
        assert_eq!(def.field("inner").unwrap().offset, 1);
        assert_eq!(def.field("tail").unwrap().offset, 3);
    }

    #[test]
    fn readding_fails() {
        let mut catalog = TypeCatalog::new();
        assert!(catalog.add("S", vec![("a".to_string(), Type::Int(1))]).is_some());
        assert!(catalog.add("S", vec![("b".to_string(), Type::Int(1))]).is_none());
        assert_eq!(catalog.lookup("S").unwrap().as_struct().unwrap().fields()[0].name, "a");
    }

    #[test]
    fn struct_equality_is_by_name() {
        let mut catalog = TypeCatalog::new();
        catalog.add("S", vec![("a".to_string(), Type::Int(1))]);
        assert_eq!(catalog.lookup("S").unwrap(), catalog.lookup("S").unwrap());
        assert_ne!(catalog.lookup("S").unwrap(), Type::Int(1));
    }
}
