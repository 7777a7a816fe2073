use std::collections::hash_map::Iter;

use fxhash::FxHashMap;

use crate::assembler::ErrorKind;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Symtab {
    inner: FxHashMap<String, u16>,
}

impl Symtab {
    #[inline]
    pub fn new() -> Self {
        Self {
            inner: FxHashMap::default(),
        }
    }

    pub fn define(&mut self, key: String, value: u16) -> Result<(), ErrorKind> {
        if self.inner.contains_key(&key) {
            return Err(ErrorKind::DuplicateLabel(key));
        }
        self.inner.insert(key, value);
        Ok(())
    }

    #[inline]
    pub fn get(&self, key: &str) -> Option<u16> {
        self.inner.get(key).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn sorted(&self) -> Vec<(&str, u16)> {
        let mut symbols: Vec<_> = self
            .into_iter()
            .map(|(key, value)| (key.as_str(), *value))
            .collect();
        symbols.sort_by(|(lkey, lvalue), (rkey, rvalue)| lvalue.cmp(rvalue).then(lkey.cmp(rkey)));
        symbols
    }
}

impl<'a> IntoIterator for &'a Symtab {
    type IntoIter = SymtabIter<'a>;
    type Item = (&'a String, &'a u16);

    fn into_iter(self) -> Self::IntoIter {
        SymtabIter {
            inner: self.inner.iter(),
        }
    }
}

pub struct SymtabIter<'a> {
    inner: Iter<'a, String, u16>,
}

impl<'a> Iterator for SymtabIter<'a> {
    type Item = (&'a String, &'a u16);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define() {
        let mut symtab = Symtab::new();
        assert!(symtab.is_empty());
        symtab.define("label".to_string(), 10).unwrap();
        assert_eq!(Some(10), symtab.get("label"));
        assert_eq!(None, symtab.get("other"));
        assert_eq!(1, symtab.len());
    }

    #[test]
    fn duplicate() {
        let mut symtab = Symtab::new();
        symtab.define("label".to_string(), 10).unwrap();
        assert_eq!(
            Err(ErrorKind::DuplicateLabel("label".to_string())),
            symtab.define("label".to_string(), 12)
        );
        assert_eq!(Some(10), symtab.get("label"));
    }

    #[test]
    fn sorted() {
        let mut symtab = Symtab::new();
        symtab.define("zeta".to_string(), 1).unwrap();
        symtab.define("beta".to_string(), 2).unwrap();
        symtab.define("alpha".to_string(), 2).unwrap();
        assert_eq!(vec![("zeta", 1), ("alpha", 2), ("beta", 2)], symtab.sorted());
        assert_eq!(3, symtab.into_iter().count());
    }
}
