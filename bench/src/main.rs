use social_graph_core::{Graph, GraphAnalysis, GraphConfig, IdDistance, NewUser};
use std::time::{Duration, Instant};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mode = args.get(1).map(|s| s.as_str()).unwrap_or("all");
    let user_count: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(2_000);

    if mode == "help" || mode == "--help" {
        println!("Usage: social-graph-bench [mode] [user_count]");
        println!();
        println!("Modes:");
        println!("  all         Run all generators and benchmark each (default)");
        println!("  smallworld  Ring of acquaintances plus random shortcuts");
        println!("  scalefree   Preferential attachment (a few very popular users)");
        println!("  random      Uniform random friendships");
        println!("  barbell     Two tight communities joined by a thin chain");
        println!();
        println!("Default user_count: 2000");
        return;
    }
    if user_count < 20 {
        eprintln!("user_count must be at least 20");
        return;
    }

    println!("social-graph-bench");
    println!("==================");
    println!();

    let generators: Vec<(&str, fn(u64) -> Graph)> = match mode {
        "smallworld" => vec![("Small-world (Watts-Strogatz)", gen_small_world)],
        "scalefree" => vec![("Scale-free (preferential attachment)", gen_scale_free)],
        "random" => vec![("Erdos-Renyi random", gen_random)],
        "barbell" => vec![("Barbell (community-chain-community)", gen_barbell)],
        "all" => vec![
            ("Small-world (Watts-Strogatz)", gen_small_world as fn(u64) -> Graph),
            ("Scale-free (preferential attachment)", gen_scale_free),
            ("Erdos-Renyi random", gen_random),
            ("Barbell (community-chain-community)", gen_barbell),
        ],
        _ => {
            eprintln!("Unknown mode: {}. Use --help for options.", mode);
            return;
        }
    };

    for (name, generator) in generators {
        run_benchmark(name, generator, user_count);
    }
}

fn ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn run_benchmark(name: &str, generator: fn(u64) -> Graph, user_count: u64) {
    println!("--- {} ---", name);
    println!("Target: {} users", user_count);

    let t = Instant::now();
    let graph = generator(user_count);
    let gen_time = t.elapsed();
    println!(
        "Generated in {:.2}s: {} users, {} connections, ~{:.1}MB",
        gen_time.as_secs_f64(),
        graph.user_count(),
        graph.connection_count(),
        graph.memory_usage() as f64 / 1_048_576.0
    );

    let first = user_name(0);
    let last = user_name(user_count - 1);

    println!();
    println!("{:<28} {:>12} {:>10}", "operation", "result", "time");
    println!("{:-<28} {:->12} {:->10}", "", "", "");

    let row = |label: &str, result: String, elapsed: Duration| {
        println!("{:<28} {:>12} {:>8.1}ms", label, result, ms(elapsed));
    };

    let t = Instant::now();
    let order = social_graph_core::bfs(&graph, &first).unwrap_or_default();
    row("bfs (reached)", order.len().to_string(), t.elapsed());

    let t = Instant::now();
    let order = social_graph_core::dfs(&graph, &first).unwrap_or_default();
    row("dfs (reached)", order.len().to_string(), t.elapsed());

    let t = Instant::now();
    let path = social_graph_core::dijkstra(&graph, &first, &last);
    row("dijkstra (weight)", describe(path), t.elapsed());

    let t = Instant::now();
    let path = social_graph_core::bellman_ford(&graph, &first, &last);
    row("bellman-ford (weight)", describe(path), t.elapsed());

    let t = Instant::now();
    let path = social_graph_core::astar(&graph, &first, &last, &IdDistance);
    row("a* id-distance (weight)", describe(path), t.elapsed());

    let t = Instant::now();
    let avg = social_graph_core::average_degree(&graph);
    row("average degree", format!("{:.2}", avg), t.elapsed());

    let t = Instant::now();
    let GraphAnalysis { diameter, .. } = social_graph_core::analyze(&graph);
    row("analysis (diameter)", diameter.to_string(), t.elapsed());

    println!();
}

fn describe(path: social_graph_core::Result<Option<Vec<social_graph_core::PathStep>>>) -> String {
    match path {
        Ok(Some(p)) => social_graph_core::path_weight(&p).to_string(),
        Ok(None) => "no path".to_string(),
        Err(e) => e.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Generators: deterministic, built through the public mutation API
// ---------------------------------------------------------------------------

/// Simple LCG for deterministic, fast pseudo-random numbers.
struct FastRng(u64);

impl FastRng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next(&mut self, max: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 33) % max
    }
    fn next_f64(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
    fn weight(&mut self) -> i64 {
        self.next(10) as i64 + 1
    }
}

fn user_name(i: u64) -> String {
    format!("u{}", i)
}

/// Users `u0..u{n-1}`, registered in order so ids follow the index.
fn with_users(user_count: u64) -> (Graph, Vec<String>) {
    let mut graph = Graph::with_capacity(user_count as usize, GraphConfig::default());
    let names: Vec<String> = (0..user_count).map(user_name).collect();
    for name in &names {
        let user = NewUser::new(name.as_str(), "Bench", "User", format!("{}@bench.local", name));
        let _ = graph.add_user(user);
    }
    (graph, names)
}

/// Duplicates and self-loops are rejected by the graph and simply skipped.
fn connect(graph: &mut Graph, names: &[String], a: u64, b: u64, weight: i64) -> bool {
    graph
        .add_connection(&names[a as usize], &names[b as usize], weight)
        .is_ok()
}

/// Small-world (Watts-Strogatz): ring lattice + random rewiring.
///
/// Each user knows K neighbors on each side of a ring; each tie is rewired to
/// a random user with probability p. High clustering, short paths.
fn gen_small_world(user_count: u64) -> Graph {
    let k = 5u64;
    let p = 0.05f64;
    let (mut graph, names) = with_users(user_count);
    let mut rng = FastRng::new(67890);

    for i in 0..user_count {
        for j in 1..=k {
            let neighbor = (i + j) % user_count;
            let w = rng.weight();
            let target = if rng.next_f64() < p { rng.next(user_count) } else { neighbor };
            connect(&mut graph, &names, i, target, w);
        }
    }

    graph
}

/// Scale-free via endpoint-list sampling.
///
/// Preferential attachment by picking a random existing edge endpoint, so
/// users with more friends are more likely to gain new ones.
fn gen_scale_free(user_count: u64) -> Graph {
    let edges_per_user = 5u64;
    let (mut graph, names) = with_users(user_count);
    let mut rng = FastRng::new(12345);

    let mut endpoints: Vec<u64> = Vec::with_capacity((user_count * edges_per_user * 2) as usize);

    // Seed: small clique
    let seed = 5u64;
    for i in 0..seed {
        for j in (i + 1)..seed {
            let w = rng.weight();
            if connect(&mut graph, &names, i, j, w) {
                endpoints.push(i);
                endpoints.push(j);
            }
        }
    }

    for new_user in seed..user_count {
        for _ in 0..edges_per_user.min(new_user) {
            let target = endpoints[rng.next(endpoints.len() as u64) as usize];
            let w = rng.weight();
            if connect(&mut graph, &names, new_user, target, w) {
                endpoints.push(new_user);
                endpoints.push(target);
            }
        }
    }

    graph
}

/// Erdos-Renyi: uniform random friendships, ~5 per user.
fn gen_random(user_count: u64) -> Graph {
    let (mut graph, names) = with_users(user_count);
    let mut rng = FastRng::new(54321);

    for _ in 0..user_count * 5 {
        let a = rng.next(user_count);
        let b = rng.next(user_count);
        let w = rng.weight();
        connect(&mut graph, &names, a, b, w);
    }

    graph
}

/// Barbell: two dense communities joined by a chain of ~10 users.
///
/// The only route between the halves runs through the chain, so the first
/// and last user are as far apart as the graph allows.
fn gen_barbell(user_count: u64) -> Graph {
    let bridge_len = 10u64;
    let community = (user_count - bridge_len) / 2;
    let (mut graph, names) = with_users(user_count);
    let mut rng = FastRng::new(99999);

    let b_start = community + bridge_len;
    for base in [0, b_start] {
        for i in 0..community {
            for _ in 0..10u64.min(community - 1) {
                let target = rng.next(community);
                let w = rng.weight();
                connect(&mut graph, &names, base + i, base + target, w);
            }
        }
    }

    // Chain from the last member of A through the bridge to the first of B
    for id in (community - 1)..b_start {
        connect(&mut graph, &names, id, id + 1, 1);
    }
    // Users past the second community (odd remainder) hang off its tail
    for id in (b_start + community)..user_count {
        connect(&mut graph, &names, id - 1, id, 1);
    }

    graph
}
