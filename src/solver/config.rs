// Decision policy configs: bump each learned literal's variable by 1, halve every score after
// every 3rd learned clause.
pub const VSIDS_DEFAULT: HeuristicOption = HeuristicOption::Vsids {
    bump: 1.0,
    decay_interval: 3,
    decay_factor: 0.5,
};

#[derive(Clone, Debug)]
pub struct SolverConfig {
    /// How unit propagation finds unit and conflicting clauses.
    pub propagation: PropagationMode,
    pub decision_policy: DecisionPolicy,
    /// Re-check a SAT model against every original clause before reporting it.
    pub verify_model: bool,
}

impl SolverConfig {
    pub fn decision_config(&self) -> DecisionConfig {
        let HeuristicOption::Vsids {
            bump,
            decay_interval,
            decay_factor,
        } = self.decision_policy.heuristic;
        DecisionConfig {
            bump,
            // An interval of 0 would never decay; treat it as "every learned clause".
            decay_interval: decay_interval.max(1),
            decay_factor,
            initial_polarity: self.decision_policy.initial_polarity,
            save_phases: self.decision_policy.save_phases,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            propagation: PropagationMode::WatchedLiterals,
            decision_policy: DecisionPolicy::default(),
            verify_model: true,
        }
    }
}

/// Unit propagation strategy. Both reach the same fixpoint; they differ in cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PropagationMode {
    /// Rescan the whole clause database until a pass changes nothing.
    Rescan,
    /// Two-watched-literal scheme: only visit clauses watching a newly falsified literal.
    #[default]
    WatchedLiterals,
}

// Config options for decision heuristics.
#[derive(Clone, Debug)]
pub struct DecisionPolicy {
    // Branching heuristic to use
    pub heuristic: HeuristicOption,
    // Polarity of a variable before any phase is saved
    pub initial_polarity: PolarityOption,
    // Whether to remember the last polarity of an unassigned variable and branch on it
    pub save_phases: bool,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            heuristic: VSIDS_DEFAULT,
            initial_polarity: PolarityOption::Occurrence,
            save_phases: false,
        }
    }
}

// Heuristic configs
#[derive(Clone, Copy, Debug)]
pub enum HeuristicOption {
    /// bump: amount added to a variable's score per occurrence in a learned clause.
    /// decay_interval: number of learned clauses between decays.
    /// decay_factor: every score is multiplied by this on decay.
    Vsids {
        bump: f64,
        decay_interval: u64,
        decay_factor: f64,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PolarityOption {
    /// Whichever polarity occurs in more original clauses; ties go to true.
    #[default]
    Occurrence,
    True,
    False,
}

// Decision heuristics config, flattened for the heuristic itself.
#[derive(Clone, Copy, Debug)]
pub struct DecisionConfig {
    pub bump: f64,
    pub decay_interval: u64,
    pub decay_factor: f64,
    pub initial_polarity: PolarityOption,
    pub save_phases: bool,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        SolverConfig::default().decision_config()
    }
}
