//! In-memory index of content records
//!
//! The [`Catalog`] knows nothing about the filesystem or the built-in corpus.
//! It stores records keyed by id and keeps the cross-reference graph for
//! resolution, backlinks and hierarchy checks.

use std::collections::BTreeMap;

use petgraph::{Direction, algo::tarjan_scc, graphmap::DiGraphMap};
use thiserror::Error;
use tracing::instrument;

use crate::domain::{
    ContentId, ContentType, CrossReference, EducationalContent, Relationship, Status,
};

/// An in-memory collection of records.
///
/// Records are stored in insertion order and indexed by id:
/// - Records: `Vec<EducationalContent>`
/// - Id lookup: `BTreeMap<ContentId, usize>` (sorted, so iteration is in id
///   order)
/// - Cross-references: `DiGraphMap<usize, Relationship>` (edges point from
///   the referring record to the referenced record)
///
/// References to ids that are not (yet) in the catalog are kept aside and
/// wired into the graph when the target is inserted, so records can be
/// inserted in any order.
#[derive(Debug, Default)]
pub struct Catalog {
    records: Vec<EducationalContent>,
    index: BTreeMap<ContentId, usize>,
    graph: DiGraphMap<usize, Relationship>,
    pending: BTreeMap<ContentId, Vec<(usize, Relationship)>>,
}

/// Errors that can occur when building a catalog.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two records share an id.
    #[error("duplicate content id {0}")]
    DuplicateId(ContentId),
}

/// A cross-reference together with the record it points at, if that record
/// is in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedReference<'a> {
    /// The reference as written in the source record.
    pub reference: &'a CrossReference,
    /// The referenced record.
    pub target: Option<&'a EducationalContent>,
}

/// A record that refers to another record.
#[derive(Debug, Clone, Copy)]
pub struct Backlink<'a> {
    /// The referring record.
    pub source: &'a EducationalContent,
    /// The relationship the referring record declares.
    pub relationship: Relationship,
}

/// A cross-reference whose target is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference<'a> {
    /// The referring record.
    pub source: &'a ContentId,
    /// The missing target.
    pub target: &'a ContentId,
    /// The declared relationship.
    pub relationship: Relationship,
}

/// A hierarchical or sibling link that the target does not mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreciprocatedLink<'a> {
    /// The record declaring the link.
    pub source: &'a ContentId,
    /// The linked record.
    pub target: &'a ContentId,
    /// The relationship declared by the source.
    pub relationship: Relationship,
    /// The relationship the target should declare back.
    pub expected: Relationship,
}

impl Catalog {
    /// Creates a new catalog with pre-allocated capacity for the given number
    /// of records.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: BTreeMap::new(),
            graph: DiGraphMap::with_capacity(capacity, capacity * 4),
            pending: BTreeMap::new(),
        }
    }

    /// Builds a catalog from a collection of records.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two records share an id.
    pub fn from_records(
        records: impl IntoIterator<Item = EducationalContent>,
    ) -> Result<Self, CatalogError> {
        let records = records.into_iter();
        let mut catalog = Self::with_capacity(records.size_hint().0);
        for record in records {
            catalog.insert(record)?;
        }
        Ok(catalog)
    }

    /// Inserts a record into the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if a record with the same id is
    /// already present.
    #[instrument(level = "trace", skip_all, fields(id = %record.id))]
    pub fn insert(&mut self, record: EducationalContent) -> Result<(), CatalogError> {
        if self.index.contains_key(&record.id) {
            return Err(CatalogError::DuplicateId(record.id));
        }

        let node = self.records.len();
        self.graph.add_node(node);

        for reference in &record.cross_references {
            if let Some(&target) = self.index.get(&reference.target_id) {
                self.graph.add_edge(node, target, reference.relationship);
            } else {
                self.pending
                    .entry(reference.target_id.clone())
                    .or_default()
                    .push((node, reference.relationship));
            }
        }

        // Wire up references that were waiting for this record, including a
        // reference the record makes to itself.
        if let Some(waiting) = self.pending.remove(&record.id) {
            for (source, relationship) in waiting {
                self.graph.add_edge(source, node, relationship);
            }
        }

        self.index.insert(record.id.clone(), node);
        self.records.push(record);
        Ok(())
    }

    /// Returns the number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the catalog holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds a record by id.
    #[must_use]
    pub fn get(&self, id: &ContentId) -> Option<&EducationalContent> {
        self.index.get(id).map(|&node| &self.records[node])
    }

    /// Finds a record by an id given as a string.
    ///
    /// Returns `None` if the string is not a valid id or no record has it.
    #[must_use]
    pub fn get_str(&self, id: &str) -> Option<&EducationalContent> {
        self.get(&id.parse().ok()?)
    }

    /// Checks whether a record with the given id is present.
    #[must_use]
    pub fn contains(&self, id: &ContentId) -> bool {
        self.index.contains_key(id)
    }

    /// Returns an iterator over all ids, in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &ContentId> {
        self.index.keys()
    }

    /// Returns an iterator over all records, sorted by id.
    pub fn iter(&self) -> impl Iterator<Item = &EducationalContent> {
        self.index.values().map(|&node| &self.records[node])
    }

    /// Returns the records whose id starts with `prefix`.
    pub fn with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a EducationalContent> + 'a {
        self.iter()
            .filter(move |record| record.id.as_str().starts_with(prefix))
    }

    /// Returns the records matching a free-text query.
    ///
    /// See [`EducationalContent::matches`].
    pub fn search<'a>(&'a self, query: &'a str) -> impl Iterator<Item = &'a EducationalContent> + 'a {
        self.iter().filter(move |record| record.matches(query))
    }

    /// Returns the records carrying a tag.
    ///
    /// See [`EducationalContent::has_tag`].
    pub fn with_tag<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a EducationalContent> + 'a {
        self.iter().filter(move |record| record.has_tag(tag))
    }

    /// Returns the number of records of each content type.
    #[must_use]
    pub fn count_by_type(&self) -> BTreeMap<ContentType, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.content_type).or_default() += 1;
        }
        counts
    }

    /// Returns the number of records in each editorial status.
    #[must_use]
    pub fn count_by_status(&self) -> BTreeMap<Status, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.status).or_default() += 1;
        }
        counts
    }

    /// Returns the cross-references of a record, each paired with the record
    /// it points at.
    ///
    /// Returns an empty list if the record does not exist.
    #[must_use]
    pub fn cross_references(&self, id: &ContentId) -> Vec<ResolvedReference<'_>> {
        let Some(record) = self.get(id) else {
            return Vec::new();
        };

        record
            .cross_references
            .iter()
            .map(|reference| ResolvedReference {
                reference,
                target: self.get(&reference.target_id),
            })
            .collect()
    }

    /// Returns the records that refer to the given record, sorted by the
    /// referring id.
    #[must_use]
    pub fn referenced_by(&self, id: &ContentId) -> Vec<Backlink<'_>> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };

        let mut sources: Vec<&EducationalContent> = self
            .graph
            .neighbors_directed(node, Direction::Incoming)
            .map(|source| &self.records[source])
            .collect();
        sources.sort_by(|a, b| a.id.cmp(&b.id));

        sources
            .into_iter()
            .flat_map(|source| {
                source
                    .cross_references
                    .iter()
                    .filter(|reference| &reference.target_id == id)
                    .map(move |reference| Backlink {
                        source,
                        relationship: reference.relationship,
                    })
            })
            .collect()
    }

    /// Returns every cross-reference whose target is not in the catalog.
    #[must_use]
    pub fn dangling_references(&self) -> Vec<DanglingReference<'_>> {
        self.iter()
            .flat_map(|record| {
                record
                    .cross_references
                    .iter()
                    .filter(|reference| !self.contains(&reference.target_id))
                    .map(move |reference| DanglingReference {
                        source: &record.id,
                        target: &reference.target_id,
                        relationship: reference.relationship,
                    })
            })
            .collect()
    }

    /// Finds cycles in the parent/child hierarchy.
    ///
    /// A `parent` reference from A to B and a `child` reference from B to A
    /// both mean "B is above A". Each returned cycle lists the ids involved in
    /// sorted order; cycles are sorted by their first id.
    #[instrument(level = "debug", skip(self))]
    #[must_use]
    pub fn hierarchy_cycles(&self) -> Vec<Vec<ContentId>> {
        // Edges point from a record to the record above it. Built from the
        // records rather than `self.graph`, which keeps one edge per pair.
        let mut hierarchy: DiGraphMap<usize, ()> = DiGraphMap::with_capacity(self.len(), self.len());
        for (node, record) in self.records.iter().enumerate() {
            hierarchy.add_node(node);
            for reference in &record.cross_references {
                let Some(&target) = self.index.get(&reference.target_id) else {
                    continue;
                };
                match reference.relationship {
                    Relationship::Parent => {
                        hierarchy.add_edge(node, target, ());
                    }
                    Relationship::Child => {
                        hierarchy.add_edge(target, node, ());
                    }
                    _ => {}
                }
            }
        }

        let mut cycles: Vec<Vec<ContentId>> = tarjan_scc(&hierarchy)
            .into_iter()
            .filter(|component| {
                component.len() > 1 || hierarchy.contains_edge(component[0], component[0])
            })
            .map(|component| {
                let mut ids: Vec<ContentId> = component
                    .into_iter()
                    .map(|node| self.records[node].id.clone())
                    .collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Finds parent, child and sibling links that the target record does not
    /// declare back.
    ///
    /// Links to records outside the catalog are ignored here; they are
    /// reported by [`Catalog::dangling_references`].
    #[must_use]
    pub fn unreciprocated_links(&self) -> Vec<UnreciprocatedLink<'_>> {
        let mut links = Vec::new();

        for record in self.iter() {
            for reference in &record.cross_references {
                let Some(expected) = reference.relationship.inverse() else {
                    continue;
                };
                let Some(target) = self.get(&reference.target_id) else {
                    continue;
                };
                if target.id == record.id {
                    continue;
                }

                let mirrored = target.cross_references.iter().any(|back| {
                    back.target_id == record.id && back.relationship == expected
                });
                if !mirrored {
                    links.push(UnreciprocatedLink {
                        source: &record.id,
                        target: &target.id,
                        relationship: reference.relationship,
                        expected,
                    });
                }
            }
        }

        links
    }
}
