use rand::rngs::SmallRng;
use rand::SeedableRng;
use rematch::api::{find_best_perfect_matching_with_rng, ResultCode};
use rematch::constraint::INFINITE_COST;

/// A participant in the rotating gift exchange.
struct Participant {
    name: &'static str,
    /// Ids this participant may never draw (and vice versa).
    impossible_recipients: Vec<usize>,
}

struct ParticipantGroup {
    participants: Vec<Participant>,
}

impl ParticipantGroup {
    fn new() -> Self {
        Self {
            participants: Vec::new(),
        }
    }

    fn add(&mut self, name: &'static str) -> usize {
        self.participants.push(Participant {
            name,
            impossible_recipients: Vec::new(),
        });
        self.participants.len() - 1
    }

    fn forbid_mutual(&mut self, a: usize, b: usize) {
        self.participants[a].impossible_recipients.push(b);
        self.participants[b].impossible_recipients.push(a);
    }

    fn name(&self, id: usize) -> &'static str {
        self.participants[id].name
    }

    /// Renders the group as the initial constraint-graph text: one vertex per
    /// participant, one infinite-cost edge per impossible recipient.
    fn graph_text(&self) -> String {
        let mut text = format!("nv {}\n", self.participants.len());
        for (id, p) in self.participants.iter().enumerate() {
            text.push_str(&format!("v {id}"));
            for &other in &p.impossible_recipients {
                text.push_str(&format!(" {other}({INFINITE_COST})"));
            }
            text.push('\n');
        }
        text
    }
}

fn main() {
    let mut years = 10usize;
    let mut seed: Option<u64> = None;

    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--years" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                years = v.parse().unwrap_or_else(|_| usage_and_exit(2));
                i += 2;
            }
            "--seed" => {
                let v = args.get(i + 1).unwrap_or_else(|| usage_and_exit(2));
                seed = Some(v.parse().unwrap_or_else(|_| usage_and_exit(2)));
                i += 2;
            }
            "--help" | "-h" => usage_and_exit(0),
            _ => usage_and_exit(2),
        }
    }

    // Four couples; spouses never draw each other.
    let mut group = ParticipantGroup::new();
    let alice = group.add("Alice");
    let aaron = group.add("Aaron");
    let becky = group.add("Becky");
    let bobby = group.add("Bobby");
    let chloe = group.add("Chloe");
    let chris = group.add("Chris");
    let diana = group.add("Diana");
    let david = group.add("David");
    group.forbid_mutual(alice, aaron);
    group.forbid_mutual(becky, bobby);
    group.forbid_mutual(chloe, chris);
    group.forbid_mutual(diana, david);

    let mut rng = match seed {
        Some(s) => SmallRng::seed_from_u64(s),
        None => SmallRng::from_os_rng(),
    };

    let mut graph_text = group.graph_text();
    for year in 0..years {
        let (code, matching, updated) = find_best_perfect_matching_with_rng(&graph_text, &mut rng);
        if code != ResultCode::Success {
            match code {
                ResultCode::KnownException => {
                    eprintln!("Failed to compute an assignment: {code}: {updated}");
                }
                _ => eprintln!("Failed to compute an assignment: {code}"),
            }
            std::process::exit(1);
        }

        let mut inverse = vec![0usize; matching.len()];
        for (id, &target) in matching.iter().enumerate() {
            inverse[target] = id;
        }

        println!("Year #{year}:");
        for (id, &target) in matching.iter().enumerate() {
            println!(
                "{} offers to {} and receives from {}",
                group.name(id),
                group.name(target),
                group.name(inverse[id])
            );
        }
        println!();

        graph_text = updated;
    }
    println!("Successfully computed {years} successive assignments!");
}

fn usage_and_exit(code: i32) -> ! {
    eprintln!(
        "Usage:\n  rematch [--years N] [--seed SEED]\n\nOptions:\n  --years N    Number of successive yearly assignments to draw (default: 10)\n  --seed SEED  Deterministic seed (optional; defaults to OS entropy)\n"
    );
    std::process::exit(code)
}
