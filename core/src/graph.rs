use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::config::GraphConfig;
use crate::error::{GraphError, Result};
use crate::model::{Connection, NewUser, UserId, UserProfile, Weight};

/// In-memory social graph: user arena + name index + adjacency lists.
///
/// Every logical (undirected) edge {a, b} is stored as two directed
/// `Connection`s, `a→b` in `adjacency[a]` and `b→a` in `adjacency[b]`, with
/// equal weight. All mutations go through routines that touch both halves.
pub struct Graph {
    users: BTreeMap<UserId, UserProfile>,
    name_index: HashMap<String, UserId>,
    adjacency: HashMap<UserId, Vec<Connection>>,
    next_id: UserId,
    config: GraphConfig,
}

impl Graph {
    pub fn new() -> Self {
        Self::with_config(GraphConfig::default())
    }

    pub fn with_config(config: GraphConfig) -> Self {
        Self {
            users: BTreeMap::new(),
            name_index: HashMap::new(),
            adjacency: HashMap::new(),
            next_id: 1,
            config,
        }
    }

    /// Pre-allocate for a known number of users.
    pub fn with_capacity(user_count: usize, config: GraphConfig) -> Self {
        let mut graph = Self::with_config(config);
        graph.name_index.reserve(user_count);
        graph.adjacency.reserve(user_count);
        graph
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user and assign it the next identifier.
    ///
    /// A rejected profile leaves the graph and the id counter untouched.
    pub fn add_user(&mut self, user: NewUser) -> Result<UserId> {
        user.validate()?;
        if self.name_index.contains_key(&user.username) {
            return Err(GraphError::DuplicateUser(user.username));
        }

        let id = self.next_id;
        self.next_id += 1;

        self.name_index.insert(user.username.clone(), id);
        self.adjacency.insert(id, Vec::new());
        let profile = UserProfile::from_new(id, user);
        tracing::debug!(user_id = id, username = %profile.username(), "user added");
        self.users.insert(id, profile);
        Ok(id)
    }

    /// Remove a user together with every connection touching it.
    pub fn remove_user(&mut self, username: &str) -> Result<UserProfile> {
        let id = self.require(username)?;
        let dropped = self.detach(id);

        self.adjacency.remove(&id);
        self.name_index.remove(username);
        let profile = self
            .users
            .remove(&id)
            .ok_or_else(|| GraphError::UserNotFound(username.to_string()))?;

        tracing::debug!(user_id = id, username, connections = dropped, "user removed");
        Ok(profile)
    }

    /// Replace the display fields of an existing user. Identity is unchanged.
    pub fn update_profile(
        &mut self,
        username: &str,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Result<()> {
        let id = self.require(username)?;
        let profile = self
            .users
            .get_mut(&id)
            .ok_or_else(|| GraphError::UserNotFound(username.to_string()))?;
        profile.set_display_fields(first_name.into(), last_name.into(), email.into());
        Ok(())
    }

    /// Look up a user by username.
    pub fn user(&self, username: &str) -> Option<&UserProfile> {
        self.resolve(username).and_then(|id| self.users.get(&id))
    }

    pub fn user_by_id(&self, id: UserId) -> Option<&UserProfile> {
        self.users.get(&id)
    }

    /// True if the username is already taken.
    pub fn contains_user(&self, username: &str) -> bool {
        self.name_index.contains_key(username)
    }

    /// Map a username to its identifier.
    pub fn resolve(&self, username: &str) -> Option<UserId> {
        self.name_index.get(username).copied()
    }

    pub(crate) fn require(&self, username: &str) -> Result<UserId> {
        self.resolve(username)
            .ok_or_else(|| GraphError::UserNotFound(username.to_string()))
    }

    /// Username for an identifier, or "" if it is not registered.
    pub(crate) fn name_of(&self, id: UserId) -> &str {
        self.users.get(&id).map(|u| u.username()).unwrap_or_default()
    }

    /// All users in identifier (creation) order.
    pub fn users(&self) -> impl Iterator<Item = &UserProfile> {
        self.users.values()
    }

    pub fn user_ids(&self) -> impl Iterator<Item = UserId> + '_ {
        self.users.keys().copied()
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Connect two users with a weight (non-positive weights become 1).
    ///
    /// Inserts both directed halves. Returns the normalized weight.
    pub fn add_connection(&mut self, source: &str, destination: &str, weight: i64) -> Result<Weight> {
        let from = self.require(source)?;
        let to = self.require(destination)?;
        if from == to {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        if self.edge_index(from, to).is_some() {
            return Err(GraphError::DuplicateConnection {
                from: source.to_string(),
                to: destination.to_string(),
            });
        }

        let forward = Connection::new(from, to, weight);
        self.link(forward);
        tracing::debug!(source, destination, weight = forward.weight, "connection added");
        Ok(forward.weight)
    }

    /// Connect two users with the configured default weight.
    pub fn add_connection_default(&mut self, source: &str, destination: &str) -> Result<Weight> {
        let weight = self.config.default_weight() as i64;
        self.add_connection(source, destination, weight)
    }

    /// Remove the logical edge between two users (both directed halves).
    pub fn remove_connection(&mut self, source: &str, destination: &str) -> Result<Weight> {
        let from = self.require(source)?;
        let to = self.require(destination)?;
        let weight = self.unlink(from, to).ok_or_else(|| GraphError::ConnectionNotFound {
            from: source.to_string(),
            to: destination.to_string(),
        })?;
        tracing::debug!(source, destination, "connection removed");
        Ok(weight)
    }

    /// Remove every edge incident to `username`, keeping the user itself.
    ///
    /// Returns the number of logical edges removed; 0 for an unknown user.
    pub fn delete_connections_of_user(&mut self, username: &str) -> usize {
        match self.resolve(username) {
            Some(id) => {
                let dropped = self.detach(id);
                tracing::debug!(username, connections = dropped, "connections of user deleted");
                dropped
            }
            None => 0,
        }
    }

    /// True iff the directed edge `source→destination` exists.
    pub fn is_connected(&self, source: &str, destination: &str) -> bool {
        self.weight(source, destination).is_some()
    }

    /// Weight of the directed edge `source→destination`, if present.
    pub fn weight(&self, source: &str, destination: &str) -> Option<Weight> {
        let from = self.resolve(source)?;
        let to = self.resolve(destination)?;
        self.edge_index(from, to)
            .map(|i| self.neighbors_out(from)[i].weight)
    }

    /// Outgoing connections of a user, in insertion order.
    pub fn connections_of(&self, username: &str) -> Result<&[Connection]> {
        let id = self.require(username)?;
        Ok(self.neighbors_out(id))
    }

    /// Usernames of everyone directly connected to `username`.
    pub fn connected_users(&self, username: &str) -> Result<Vec<String>> {
        Ok(self
            .connections_of(username)?
            .iter()
            .map(|c| self.name_of(c.destination).to_string())
            .collect())
    }

    /// Get outgoing edges for a user id.
    pub fn neighbors_out(&self, id: UserId) -> &[Connection] {
        self.adjacency.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Drop every connection, keep every user.
    pub fn clear_connections(&mut self) {
        for edges in self.adjacency.values_mut() {
            edges.clear();
        }
        tracing::debug!("all connections cleared");
    }

    /// Drop every connection and every user. Identifiers are not reused.
    pub fn clear(&mut self) {
        self.adjacency.clear();
        self.name_index.clear();
        self.users.clear();
        tracing::debug!("graph cleared");
    }

    // -----------------------------------------------------------------------
    // Paired-edge maintenance
    // -----------------------------------------------------------------------

    fn edge_index(&self, from: UserId, to: UserId) -> Option<usize> {
        self.neighbors_out(from)
            .iter()
            .position(|c| c.destination == to)
    }

    fn link(&mut self, forward: Connection) {
        self.adjacency
            .entry(forward.source)
            .or_default()
            .push(forward);
        self.adjacency
            .entry(forward.destination)
            .or_default()
            .push(forward.reversed());
    }

    /// Locate both halves first, then remove both.
    fn unlink(&mut self, from: UserId, to: UserId) -> Option<Weight> {
        let forward_idx = self.edge_index(from, to)?;
        let reverse_idx = self.edge_index(to, from);
        debug_assert!(reverse_idx.is_some(), "half-edge {from}->{to} has no pair");

        let removed = self.adjacency.get_mut(&from)?.remove(forward_idx);
        if let (Some(idx), Some(edges)) = (reverse_idx, self.adjacency.get_mut(&to)) {
            edges.remove(idx);
        }
        Some(removed.weight)
    }

    /// Remove both halves of every edge incident to `id`.
    fn detach(&mut self, id: UserId) -> usize {
        let outgoing = match self.adjacency.get_mut(&id) {
            Some(edges) => std::mem::take(edges),
            None => return 0,
        };
        for edge in &outgoing {
            if let Some(edges) = self.adjacency.get_mut(&edge.destination) {
                edges.retain(|c| c.destination != id);
            }
        }
        outgoing.len()
    }

    // -----------------------------------------------------------------------
    // Counts
    // -----------------------------------------------------------------------

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    /// Number of logical (undirected) edges.
    pub fn connection_count(&self) -> usize {
        self.directed_edge_count() / 2
    }

    /// Number of directed records, twice the logical edge count.
    pub fn directed_edge_count(&self) -> usize {
        self.adjacency.values().map(|v| v.len()).sum()
    }

    /// Approximate memory usage in bytes.
    pub fn memory_usage(&self) -> usize {
        use std::mem::size_of;

        let users_mem: usize = self
            .users
            .values()
            .map(|u| {
                size_of::<UserProfile>()
                    + u.username().len()
                    + u.first_name().len()
                    + u.last_name().len()
                    + u.email().len()
            })
            .sum();
        let edges_mem = self.directed_edge_count() * size_of::<Connection>();
        let index_mem = self.name_index.len() * (size_of::<UserId>() + 40);

        users_mem + edges_mem + index_mem
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Adjacency listing, one user per line in identifier order.
impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.users.is_empty() {
            return writeln!(f, "Graph is empty");
        }
        for (&id, user) in &self.users {
            let names: Vec<&str> = self
                .neighbors_out(id)
                .iter()
                .map(|c| self.name_of(c.destination))
                .collect();
            writeln!(f, "{}: {}", user.username(), names.join(", "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(name: &str) -> NewUser {
        NewUser::new(name, "First", "Last", format!("{name}@example.com"))
    }

    fn with_users(names: &[&str]) -> Graph {
        let mut g = Graph::new();
        for n in names {
            g.add_user(user(n)).unwrap();
        }
        g
    }

    /// Every directed record has exactly one pair with the same weight.
    fn assert_paired(g: &Graph) {
        for id in g.user_ids() {
            for c in g.neighbors_out(id) {
                let back: Vec<_> = g
                    .neighbors_out(c.destination)
                    .iter()
                    .filter(|r| r.destination == id)
                    .collect();
                assert_eq!(back.len(), 1, "edge {}->{} unpaired", id, c.destination);
                assert_eq!(back[0].weight, c.weight);
            }
        }
    }

    // --- Users ---

    #[test]
    fn test_add_user_assigns_monotonic_ids() {
        let mut g = Graph::new();
        let a = g.add_user(user("a")).unwrap();
        let b = g.add_user(user("b")).unwrap();
        assert!(b > a);
        assert_eq!(g.user("a").unwrap().id(), a);
        assert_eq!(g.user_count(), 2);
    }

    #[test]
    fn test_duplicate_user_rejected_without_consuming_id() {
        let mut g = Graph::new();
        let a = g.add_user(user("a")).unwrap();
        assert_eq!(
            g.add_user(user("a")),
            Err(GraphError::DuplicateUser("a".to_string()))
        );
        assert!(g.add_user(user("bad name")).is_err());
        let b = g.add_user(user("b")).unwrap();
        assert_eq!(b, a + 1);
        assert_eq!(g.user_count(), 2);
    }

    #[test]
    fn test_ids_not_reused_after_removal() {
        let mut g = with_users(&["a", "b"]);
        g.remove_user("b").unwrap();
        let c = g.add_user(user("c")).unwrap();
        assert_eq!(c, 3);
        g.clear();
        assert_eq!(g.add_user(user("d")).unwrap(), 4);
    }

    #[test]
    fn test_remove_unknown_user() {
        let mut g = with_users(&["a"]);
        assert_eq!(
            g.remove_user("zed"),
            Err(GraphError::UserNotFound("zed".to_string()))
        );
    }

    #[test]
    fn test_update_profile_keeps_identity() {
        let mut g = with_users(&["a"]);
        let id = g.user("a").unwrap().id();
        g.update_profile("a", "Ada", "Lovelace", "ada@example.com").unwrap();
        let p = g.user("a").unwrap();
        assert_eq!(p.id(), id);
        assert_eq!(p.first_name(), "Ada");
        assert_eq!(p.email(), "ada@example.com");
        assert!(g.update_profile("nobody", "x", "y", "z").is_err());
    }

    // --- Connections ---

    #[test]
    fn test_add_connection_is_symmetric() {
        let mut g = with_users(&["a", "b"]);
        assert_eq!(g.add_connection("a", "b", 7), Ok(7));
        assert!(g.is_connected("a", "b"));
        assert!(g.is_connected("b", "a"));
        assert_eq!(g.weight("a", "b"), Some(7));
        assert_eq!(g.weight("b", "a"), Some(7));
        assert_eq!(g.connection_count(), 1);
        assert_eq!(g.directed_edge_count(), 2);
        assert_paired(&g);
    }

    #[test]
    fn test_add_connection_normalizes_weight() {
        let mut g = with_users(&["a", "b", "c"]);
        assert_eq!(g.add_connection("a", "b", 0), Ok(1));
        assert_eq!(g.add_connection("a", "c", -5), Ok(1));
        assert_eq!(g.weight("c", "a"), Some(1));
    }

    #[test]
    fn test_add_connection_default_weight() {
        let mut g = Graph::with_config(GraphConfig { default_weight: 3 });
        g.add_user(user("a")).unwrap();
        g.add_user(user("b")).unwrap();
        assert_eq!(g.add_connection_default("a", "b"), Ok(3));
        assert_eq!(g.weight("b", "a"), Some(3));
    }

    #[test]
    fn test_with_capacity_keeps_config() {
        let mut g = Graph::with_capacity(16, GraphConfig { default_weight: 5 });
        g.add_user(user("a")).unwrap();
        g.add_user(user("b")).unwrap();
        assert_eq!(g.add_connection_default("a", "b"), Ok(5));
        assert_eq!(g.user("a").unwrap().id(), 1);
    }

    #[test]
    fn test_add_connection_rejections() {
        let mut g = with_users(&["a", "b"]);
        assert_eq!(
            g.add_connection("a", "x", 1),
            Err(GraphError::UserNotFound("x".to_string()))
        );
        assert_eq!(
            g.add_connection("a", "a", 1),
            Err(GraphError::SelfLoop("a".to_string()))
        );
        g.add_connection("a", "b", 1).unwrap();
        assert!(matches!(
            g.add_connection("a", "b", 2),
            Err(GraphError::DuplicateConnection { .. })
        ));
        // Reverse direction is the same logical edge
        assert!(matches!(
            g.add_connection("b", "a", 2),
            Err(GraphError::DuplicateConnection { .. })
        ));
        assert_eq!(g.weight("a", "b"), Some(1));
        assert_eq!(g.connection_count(), 1);
    }

    #[test]
    fn test_remove_connection_removes_both_halves() {
        let mut g = with_users(&["a", "b", "c"]);
        g.add_connection("a", "b", 2).unwrap();
        g.add_connection("a", "c", 3).unwrap();
        g.add_connection("b", "c", 4).unwrap();

        assert_eq!(g.remove_connection("b", "a"), Ok(2));
        assert!(!g.is_connected("a", "b"));
        assert!(!g.is_connected("b", "a"));
        assert!(g.is_connected("a", "c"));
        assert!(g.is_connected("c", "b"));
        assert_eq!(g.connection_count(), 2);
        assert_paired(&g);
    }

    #[test]
    fn test_remove_missing_connection() {
        let mut g = with_users(&["a", "b"]);
        assert!(matches!(
            g.remove_connection("a", "b"),
            Err(GraphError::ConnectionNotFound { .. })
        ));
        assert!(matches!(
            g.remove_connection("a", "ghost"),
            Err(GraphError::UserNotFound(_))
        ));
    }

    #[test]
    fn test_remove_user_cascades() {
        let mut g = with_users(&["a", "b", "c", "d"]);
        g.add_connection("a", "b", 1).unwrap();
        g.add_connection("c", "a", 1).unwrap();
        g.add_connection("b", "c", 1).unwrap();
        g.add_connection("a", "d", 1).unwrap();

        let removed = g.remove_user("a").unwrap();
        assert_eq!(removed.username(), "a");
        assert!(g.user("a").is_none());
        for id in g.user_ids() {
            assert!(g
                .neighbors_out(id)
                .iter()
                .all(|c| c.source != removed.id() && c.destination != removed.id()));
        }
        assert_eq!(g.connection_count(), 1);
        assert!(g.is_connected("b", "c"));
        assert_paired(&g);
    }

    #[test]
    fn test_delete_connections_of_user_keeps_user() {
        let mut g = with_users(&["a", "b", "c"]);
        g.add_connection("a", "b", 1).unwrap();
        g.add_connection("a", "c", 1).unwrap();
        g.add_connection("b", "c", 1).unwrap();

        assert_eq!(g.delete_connections_of_user("a"), 2);
        assert!(g.contains_user("a"));
        assert!(g.connections_of("a").unwrap().is_empty());
        assert!(!g.is_connected("b", "a"));
        assert!(g.is_connected("b", "c"));
        assert_paired(&g);

        // No edges left, unknown user: both no-ops
        assert_eq!(g.delete_connections_of_user("a"), 0);
        assert_eq!(g.delete_connections_of_user("nobody"), 0);
    }

    #[test]
    fn test_connected_users_in_insertion_order() {
        let mut g = with_users(&["a", "b", "c", "d"]);
        g.add_connection("a", "d", 1).unwrap();
        g.add_connection("a", "b", 1).unwrap();
        g.add_connection("c", "a", 1).unwrap();
        assert_eq!(g.connected_users("a").unwrap(), vec!["d", "b", "c"]);
        assert!(g.connected_users("zz").is_err());
    }

    #[test]
    fn test_clear_connections_keeps_users() {
        let mut g = with_users(&["a", "b"]);
        g.add_connection("a", "b", 1).unwrap();
        g.clear_connections();
        assert_eq!(g.user_count(), 2);
        assert_eq!(g.connection_count(), 0);
        g.clear();
        assert_eq!(g.user_count(), 0);
        assert!(!g.contains_user("a"));
    }

    #[test]
    fn test_display_lists_adjacency() {
        let mut g = with_users(&["a", "b", "c"]);
        g.add_connection("a", "b", 1).unwrap();
        g.add_connection("a", "c", 1).unwrap();
        let text = g.to_string();
        assert!(text.contains("a: b, c\n"));
        assert!(text.contains("b: a\n"));
        assert_eq!(Graph::new().to_string(), "Graph is empty\n");
    }

    #[test]
    fn test_memory_usage_nonzero() {
        let mut g = with_users(&["a", "b"]);
        g.add_connection("a", "b", 1).unwrap();
        assert!(g.memory_usage() > 0);
    }
}
