use super::*;
use dashmap::DashMap;
use std::any::Any;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::LazyLock;

type Getter<T> = Box<dyn Fn(&T) -> Value + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Value) -> std::result::Result<(), Mismatch> + Send + Sync>;

/// Compiled tables, one per mapped type, for the lifetime of the process.
static CACHE: LazyLock<DashMap<TypeId, Arc<dyn Any + Send + Sync>>> = LazyLock::new(DashMap::new);

/// A type whose members can be read and written by name.
///
/// Usually implemented through [`mapped!`](crate::mapped), which expands
/// each member into direct field closures. [`Accessors::resolve`] calls
/// [`members`](Mapped::members) at most a handful of times per type and
/// caches the result.
pub trait Mapped: Sized + Send + Sync + 'static {
    fn members() -> Vec<Member<Self>>;
}

/// Get/set pair for one named member of `T`.
///
/// Either side may be absent. A member with neither side is dropped when
/// the table is compiled.
pub struct Member<T> {
    name: &'static str,
    getter: Option<Getter<T>>,
    setter: Option<Setter<T>>,
}

impl<T> Member<T>
where
    T: 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            getter: None,
            setter: None,
        }
    }
    pub fn getter<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Value + Send + Sync + 'static,
    {
        self.getter = Some(Box::new(f));
        self
    }
    pub fn setter<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut T, Value) -> std::result::Result<(), Mismatch> + Send + Sync + 'static,
    {
        self.setter = Some(Box::new(f));
        self
    }
    pub fn name(&self) -> &'static str {
        self.name
    }
    /// Name of the type that declares this member.
    pub fn declaring(&self) -> &'static str {
        std::any::type_name::<T>()
    }
    pub fn is_readable(&self) -> bool {
        self.getter.is_some()
    }
    pub fn is_writable(&self) -> bool {
        self.setter.is_some()
    }
    pub fn get(&self, target: &T) -> std::result::Result<Value, AccessorError> {
        self.getter
            .as_ref()
            .map(|get| get(target))
            .ok_or_else(|| AccessorError::NotReadable {
                ty: self.declaring(),
                member: self.name.to_owned(),
            })
    }
    pub fn set(&self, target: &mut T, value: Value) -> std::result::Result<(), AccessorError> {
        let set = self
            .setter
            .as_ref()
            .ok_or_else(|| AccessorError::NotWritable {
                ty: self.declaring(),
                member: self.name.to_owned(),
            })?;
        set(target, value).map_err(|source| AccessorError::TypeMismatch {
            ty: self.declaring(),
            member: self.name.to_owned(),
            source,
        })
    }
}

impl<T> std::fmt::Debug for Member<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("readable", &self.getter.is_some())
            .field("writable", &self.setter.is_some())
            .finish()
    }
}

/// Compiled member table of one mapped type.
///
/// Immutable once built; shared as `Arc<Accessors<T>>` by every stream
/// that projects into `T`.
#[derive(Debug)]
pub struct Accessors<T> {
    members: Vec<Member<T>>,
    index: HashMap<&'static str, usize>,
}

impl<T> Accessors<T>
where
    T: Mapped,
{
    /// Returns the table for `T`, compiling it on first use.
    ///
    /// Concurrent first callers may each compile a table, but only the first
    /// one published is ever handed out, so every caller observes the same
    /// `Arc`. Compilation runs outside the cache lock, which keeps
    /// [`Mapped::members`] free to resolve other types.
    pub fn resolve() -> Arc<Self> {
        let id = TypeId::of::<T>();
        if let Some(cached) = CACHE.get(&id).map(|entry| Arc::clone(entry.value())) {
            return Self::downcast(cached);
        }
        let built = Arc::new(Self::compile()) as Arc<dyn Any + Send + Sync>;
        let published = Arc::clone(CACHE.entry(id).or_insert(built).value());
        Self::downcast(published)
    }

    /// Builds a fresh table without touching the cache.
    pub fn compile() -> Self {
        let ty = std::any::type_name::<T>();
        let mut members = Vec::new();
        let mut index = HashMap::new();
        for member in T::members() {
            if !member.is_readable() && !member.is_writable() {
                log::warn!("skipping {}::{}, neither readable nor writable", ty, member.name());
                continue;
            }
            if index.contains_key(member.name()) {
                log::warn!("skipping duplicate member {}::{}", ty, member.name());
                continue;
            }
            index.insert(member.name(), members.len());
            members.push(member);
        }
        log::debug!("compiled {} accessors for {}", members.len(), ty);
        Self { members, index }
    }

    fn downcast(cached: Arc<dyn Any + Send + Sync>) -> Arc<Self> {
        cached.downcast::<Self>().unwrap_or_else(|_| {
            log::error!("accessor cache entry for {} has the wrong type", std::any::type_name::<T>());
            Arc::new(Self::compile())
        })
    }
}

impl<T> Accessors<T>
where
    T: 'static,
{
    pub fn member(&self, name: &str) -> Option<&Member<T>> {
        self.index.get(name).map(|&i| &self.members[i])
    }
    pub(crate) fn ordinal(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }
    pub(crate) fn at(&self, ordinal: usize) -> &Member<T> {
        &self.members[ordinal]
    }
    /// Reads the member called `name`.
    pub fn get(&self, target: &T, name: &str) -> std::result::Result<Value, AccessorError> {
        self.lookup(name)?.get(target)
    }
    /// Writes the member called `name`.
    pub fn set(&self, target: &mut T, name: &str, value: Value) -> std::result::Result<(), AccessorError> {
        self.lookup(name)?.set(target, value)
    }
    pub fn iter(&self) -> impl Iterator<Item = &Member<T>> {
        self.members.iter()
    }
    pub fn readable(&self) -> impl Iterator<Item = &Member<T>> {
        self.members.iter().filter(|m| m.is_readable())
    }
    pub fn writable(&self) -> impl Iterator<Item = &Member<T>> {
        self.members.iter().filter(|m| m.is_writable())
    }
    pub fn len(&self) -> usize {
        self.members.len()
    }
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    fn lookup(&self, name: &str) -> std::result::Result<&Member<T>, AccessorError> {
        self.member(name).ok_or_else(|| AccessorError::UnknownMember {
            ty: std::any::type_name::<T>(),
            member: name.to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Account {
        id: i64,
        owner: String,
        balance: Option<f64>,
        opened: i64,
    }

    impl Mapped for Account {
        fn members() -> Vec<Member<Self>> {
            vec![
                Member::new("id")
                    .getter(|x: &Self| Value::from(x.id))
                    .setter(|x: &mut Self, v| Ok(x.id = i64::from_value(v)?)),
                Member::new("owner")
                    .getter(|x: &Self| Value::from(x.owner.clone()))
                    .setter(|x: &mut Self, v| Ok(x.owner = String::from_value(v)?)),
                Member::new("balance")
                    .getter(|x: &Self| Value::from(x.balance))
                    .setter(|x: &mut Self, v| Ok(x.balance = Option::from_value(v)?)),
                Member::new("opened").getter(|x: &Self| Value::from(x.opened)),
                Member::new("ghost"),
                Member::new("id").getter(|_: &Self| Value::Null),
            ]
        }
    }

    #[test]
    fn resolve_is_memoized() {
        let a = Accessors::<Account>::resolve();
        let b = Accessors::<Account>::resolve();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn unusable_and_duplicate_members_are_omitted() {
        let table = Accessors::<Account>::compile();
        assert_eq!(table.len(), 4);
        assert!(table.member("ghost").is_none());
        assert!(table.member("id").unwrap().is_writable());
    }

    #[test]
    fn readonly_members_refuse_writes() {
        let table = Accessors::<Account>::resolve();
        let mut account = Account::default();
        let err = table.set(&mut account, "opened", Value::Int64(1)).unwrap_err();
        assert!(matches!(err, AccessorError::NotWritable { ref member, .. } if member == "opened"));
        assert_eq!(table.writable().count(), 3);
        assert_eq!(table.readable().count(), 4);
    }

    #[test]
    fn writeonly_members_refuse_reads() {
        let member = Member::<Account>::new("sink").setter(|_, _| Ok(()));
        let err = member.get(&Account::default()).unwrap_err();
        assert!(matches!(err, AccessorError::NotReadable { .. }));
    }

    #[test]
    fn set_then_get() {
        let table = Accessors::<Account>::resolve();
        let mut account = Account::default();
        table.set(&mut account, "id", Value::Int32(7)).unwrap();
        table.set(&mut account, "balance", Value::Null).unwrap();
        table.set(&mut account, "owner", Value::from("Ann")).unwrap();
        assert_eq!(table.get(&account, "id").unwrap(), Value::Int64(7));
        assert_eq!(table.get(&account, "owner").unwrap(), Value::from("Ann"));
        assert_eq!(account.balance, None);
    }

    #[test]
    fn mismatches_name_the_member() {
        let table = Accessors::<Account>::resolve();
        let err = table
            .set(&mut Account::default(), "owner", Value::Int32(1))
            .unwrap_err();
        assert!(matches!(err, AccessorError::TypeMismatch { ref member, .. } if member == "owner"));
        let err = table.get(&Account::default(), "missing").unwrap_err();
        assert!(matches!(err, AccessorError::UnknownMember { .. }));
    }

    #[test]
    fn concurrent_first_resolution_converges() {
        #[derive(Default)]
        struct Fresh {
            n: i32,
        }
        impl Mapped for Fresh {
            fn members() -> Vec<Member<Self>> {
                vec![
                    Member::new("n")
                        .getter(|x: &Self| Value::from(x.n))
                        .setter(|x: &mut Self, v| Ok(x.n = i32::from_value(v)?)),
                ]
            }
        }
        let barrier = Arc::new(std::sync::Barrier::new(8));
        let tables = (0..8)
            .map(|_| Arc::clone(&barrier))
            .map(|b| {
                std::thread::spawn(move || {
                    b.wait();
                    Accessors::<Fresh>::resolve()
                })
            })
            .collect::<Vec<_>>()
            .into_iter()
            .map(|h| h.join().unwrap())
            .collect::<Vec<_>>();
        for table in tables.iter() {
            assert!(Arc::ptr_eq(table, &tables[0]));
            let mut x = Fresh::default();
            table.set(&mut x, "n", Value::Int16(3)).unwrap();
            assert_eq!(table.get(&x, "n").unwrap(), Value::Int32(3));
        }
        assert!(Arc::ptr_eq(&tables[0], &Accessors::<Fresh>::resolve()));
    }
}
