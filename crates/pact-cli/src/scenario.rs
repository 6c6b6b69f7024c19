//! # Contract Scenarios
//!
//! A scenario declares named signers and contracts, then lists steps to
//! apply in order. Each step may carry an `expect` naming the result it
//! should produce (`ok`, an error name such as `no_party_b`, or for
//! `evaluate` the outcome name `pending` / `breached` / `closed_out`).
//!
//! ```yaml
//! name: escort job
//! signers:
//!   - name: frontier_guild
//!   - name: hauler
//!   - name: deserter
//!     retired: true
//! contracts:
//!   - name: escort
//!     criteria: ["freighter reaches port"]
//!     breaching_clauses:
//!       - description: freighter destroyed
//!         liable_party: party_b
//! steps:
//!   - sign: { contract: escort }
//!     expect: no_party_a
//!   - sign_on: { contract: escort, signer: frontier_guild, party: party_a }
//!   - sign_on: { contract: escort, signer: hauler, party: party_b }
//!   - sign: { contract: escort }
//!   - satisfy: { contract: escort, criterion: 0 }
//!   - evaluate: { contract: escort }
//!     expect: closed_out
//! ```
//!
//! Steps run against a real `ContractSystem` with a `SignerRegistry`, a
//! `ContractRegistry`, and a `TransitionJournal` observer.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use pact_core::{ContractId, PactError, SignerId};
use pact_state::{
    ClauseBook, ContractPolicy, ContractRegistry, ContractState, ContractSystem, Party,
    SignerRegistry, TransitionJournal,
};

// ─── Scenario document ───────────────────────────────────────────────

/// A scripted contract scenario.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Scenario {
    pub name: Option<String>,
    pub signers: Vec<SignerDecl>,
    pub contracts: Vec<ContractDecl>,
    pub steps: Vec<Step>,
}

/// Scenario as read from YAML. Steps stay raw until [`Step::from_mapping`]
/// checks their keys.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawScenario {
    name: Option<String>,
    signers: Vec<SignerDecl>,
    contracts: Vec<ContractDecl>,
    steps: Vec<Mapping>,
}

/// A named signer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SignerDecl {
    pub name: String,
    /// Start out already deleted by the host.
    #[serde(default)]
    pub retired: bool,
}

/// A named contract with its clause book.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContractDecl {
    pub name: String,
    #[serde(default)]
    pub criteria: Vec<String>,
    #[serde(default)]
    pub breaching_clauses: Vec<ClauseDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClauseDecl {
    pub description: String,
    pub liable_party: Party,
}

/// One scripted action plus an optional expected result.
#[derive(Debug, Clone, Serialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: Action,
    pub expect: Option<String>,
}

/// Keys that name an [`Action`] in a step mapping.
const ACTION_KEYS: [&str; 8] = [
    "sign_on",
    "sign",
    "breach",
    "close_out",
    "retire_signer",
    "satisfy",
    "trigger",
    "evaluate",
];

impl Step {
    /// Build step `index` from its YAML mapping.
    ///
    /// The mapping must hold exactly one action key and may hold `expect`.
    /// Anything else is rejected so a typo cannot turn into a silent pass.
    pub fn from_mapping(index: usize, mapping: Mapping) -> Result<Self, PactError> {
        let invalid = |msg: String| PactError::Config(format!("step {index}: {msg}"));

        let mut expect = None;
        let mut actions = Mapping::new();
        for (key, value) in mapping {
            let Some(name) = key.as_str() else {
                return Err(invalid(format!("non-string key {key:?}")));
            };
            if name == "expect" {
                let want = value
                    .as_str()
                    .ok_or_else(|| invalid("expect must be a string".to_string()))?;
                expect = Some(want.to_string());
            } else if ACTION_KEYS.contains(&name) {
                actions.insert(key, value);
            } else {
                return Err(invalid(format!("unknown key {name:?}")));
            }
        }

        let names: Vec<&str> = actions.iter().filter_map(|(k, _)| k.as_str()).collect();
        match names.len() {
            0 => return Err(invalid("no action".to_string())),
            1 => {}
            _ => return Err(invalid(format!("several actions: {}", names.join(", ")))),
        }
        let name = names[0].to_string();

        let action = serde_yaml::from_value(Value::Mapping(actions))
            .map_err(|e| invalid(format!("invalid {name} action: {e}")))?;
        Ok(Self { action, expect })
    }
}

/// Scripted actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum Action {
    SignOn {
        contract: String,
        signer: String,
        party: Party,
    },
    Sign {
        contract: String,
    },
    Breach {
        contract: String,
        party: Party,
    },
    CloseOut {
        contract: String,
    },
    RetireSigner {
        signer: String,
    },
    Satisfy {
        contract: String,
        criterion: usize,
    },
    Trigger {
        contract: String,
        clause: usize,
    },
    Evaluate {
        contract: String,
    },
}

impl Action {
    /// Contract this action targets, if any.
    pub fn contract(&self) -> Option<&str> {
        match self {
            Self::SignOn { contract, .. }
            | Self::Sign { contract }
            | Self::Breach { contract, .. }
            | Self::CloseOut { contract }
            | Self::Satisfy { contract, .. }
            | Self::Trigger { contract, .. }
            | Self::Evaluate { contract } => Some(contract),
            Self::RetireSigner { .. } => None,
        }
    }

    /// Signer this action names, if any.
    pub fn signer(&self) -> Option<&str> {
        match self {
            Self::SignOn { signer, .. } | Self::RetireSigner { signer } => Some(signer),
            _ => None,
        }
    }

    /// Short human-readable label.
    pub fn label(&self) -> String {
        match self {
            Self::SignOn {
                contract,
                signer,
                party,
            } => format!("sign_on {contract} {signer} {party}"),
            Self::Sign { contract } => format!("sign {contract}"),
            Self::Breach { contract, party } => format!("breach {contract} {party}"),
            Self::CloseOut { contract } => format!("close_out {contract}"),
            Self::RetireSigner { signer } => format!("retire_signer {signer}"),
            Self::Satisfy {
                contract,
                criterion,
            } => format!("satisfy {contract} #{criterion}"),
            Self::Trigger { contract, clause } => format!("trigger {contract} #{clause}"),
            Self::Evaluate { contract } => format!("evaluate {contract}"),
        }
    }
}

impl Scenario {
    /// Load and validate a scenario file.
    pub fn load(path: &Path) -> Result<Self, PactError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate scenario YAML.
    pub fn from_yaml(content: &str) -> Result<Self, PactError> {
        let raw: RawScenario = serde_yaml::from_str(content)?;
        let steps = raw
            .steps
            .into_iter()
            .enumerate()
            .map(|(index, mapping)| Step::from_mapping(index, mapping))
            .collect::<Result<Vec<_>, _>>()?;

        let scenario = Scenario {
            name: raw.name,
            signers: raw.signers,
            contracts: raw.contracts,
            steps,
        };
        scenario.validate()?;
        Ok(scenario)
    }

    /// Check names are unique and every step refers to a declared name.
    pub fn validate(&self) -> Result<(), PactError> {
        let signers = unique_names(self.signers.iter().map(|s| s.name.as_str()), "signer")?;
        let contracts = unique_names(self.contracts.iter().map(|c| c.name.as_str()), "contract")?;

        for (index, step) in self.steps.iter().enumerate() {
            if let Some(contract) = step.action.contract() {
                if !contracts.contains(contract) {
                    return Err(PactError::Config(format!(
                        "step {index}: unknown contract {contract:?}"
                    )));
                }
            }
            if let Some(signer) = step.action.signer() {
                if !signers.contains(signer) {
                    return Err(PactError::Config(format!(
                        "step {index}: unknown signer {signer:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Replay the scenario under `policy`.
    pub fn run(&self, policy: ContractPolicy) -> Result<ScenarioReport, PactError> {
        self.validate()?;
        let mut session = Session::new(self, policy);

        let mut steps = Vec::with_capacity(self.steps.len());
        for (index, step) in self.steps.iter().enumerate() {
            let (result, detail) = session.apply(&step.action)?;
            let passed = step.expect.as_deref().map_or(true, |want| want == result);
            let label = step.action.label();
            if passed {
                tracing::info!(step = index, action = %label, %result, "step applied");
            } else {
                tracing::warn!(
                    step = index,
                    action = %label,
                    %result,
                    expected = ?step.expect,
                    "step did not match expectation"
                );
            }
            steps.push(StepOutcome {
                index,
                action: label,
                result,
                detail,
                expect: step.expect.clone(),
                passed,
            });
        }

        Ok(ScenarioReport {
            name: self.name.clone(),
            steps,
            contracts: session.summaries(self),
            notifications: session.journal.len(),
        })
    }
}

fn unique_names<'a>(
    names: impl Iterator<Item = &'a str>,
    kind: &str,
) -> Result<BTreeSet<&'a str>, PactError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(PactError::Config(format!("duplicate {kind} name {name:?}")));
        }
    }
    Ok(seen)
}

// ─── Report ──────────────────────────────────────────────────────────

/// Result of replaying one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: String,
    /// `ok`, an error name, or an evaluation outcome name.
    pub result: String,
    pub detail: String,
    pub expect: Option<String>,
    pub passed: bool,
}

/// Final state of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContractSummary {
    pub name: String,
    pub id: ContractId,
    pub state: ContractState,
    pub party_a: Vec<String>,
    pub party_b: Vec<String>,
    pub transitions: usize,
}

/// Everything a scenario run produced.
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    pub name: Option<String>,
    pub steps: Vec<StepOutcome>,
    pub contracts: Vec<ContractSummary>,
    /// Number of `ContractStateChanged` notifications delivered.
    pub notifications: usize,
}

impl ScenarioReport {
    /// Steps whose result differed from their expectation.
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|step| !step.passed)
    }

    pub fn passed(&self) -> bool {
        self.failures().next().is_none()
    }

    pub fn contract(&self, name: &str) -> Option<&ContractSummary> {
        self.contracts.iter().find(|c| c.name == name)
    }
}

// ─── Session ─────────────────────────────────────────────────────────

struct Session {
    system: ContractSystem<SignerRegistry>,
    signers: SignerRegistry,
    journal: Arc<TransitionJournal>,
    registry: ContractRegistry,
    signer_ids: HashMap<String, SignerId>,
    signer_names: HashMap<SignerId, String>,
    contract_ids: BTreeMap<String, ContractId>,
    books: HashMap<String, ClauseBook>,
}

impl Session {
    fn new(scenario: &Scenario, policy: ContractPolicy) -> Self {
        let signers = SignerRegistry::new();
        let journal = Arc::new(TransitionJournal::new());
        let mut system = ContractSystem::new(signers.clone(), policy);
        system.subscribe(journal.clone());
        let registry = ContractRegistry::new();

        let mut signer_ids = HashMap::new();
        let mut signer_names = HashMap::new();
        for decl in &scenario.signers {
            let id = signers.register();
            if decl.retired {
                signers.retire(&id);
            }
            signer_ids.insert(decl.name.clone(), id);
            signer_names.insert(id, decl.name.clone());
        }

        let mut contract_ids = BTreeMap::new();
        let mut books = HashMap::new();
        for decl in &scenario.contracts {
            let id = registry.create();
            let mut book = ClauseBook::new(id);
            for criterion in &decl.criteria {
                book.add_criterion(criterion.as_str());
            }
            for clause in &decl.breaching_clauses {
                book.add_breaching_clause(clause.description.as_str(), clause.liable_party);
            }
            contract_ids.insert(decl.name.clone(), id);
            books.insert(decl.name.clone(), book);
        }

        Self {
            system,
            signers,
            journal,
            registry,
            signer_ids,
            signer_names,
            contract_ids,
            books,
        }
    }

    fn contract_id(&self, name: &str) -> Result<ContractId, PactError> {
        self.contract_ids
            .get(name)
            .copied()
            .ok_or_else(|| PactError::Config(format!("unknown contract {name:?}")))
    }

    fn signer_id(&self, name: &str) -> Result<SignerId, PactError> {
        self.signer_ids
            .get(name)
            .copied()
            .ok_or_else(|| PactError::Config(format!("unknown signer {name:?}")))
    }

    fn book_mut(&mut self, name: &str) -> Result<&mut ClauseBook, PactError> {
        self.books
            .get_mut(name)
            .ok_or_else(|| PactError::Config(format!("unknown contract {name:?}")))
    }

    /// Run `f` on a contract; lookup failures become `PactError`.
    fn on_contract<R>(
        &self,
        name: &str,
        f: impl FnOnce(&ContractSystem<SignerRegistry>, &mut pact_state::Contract) -> R,
    ) -> Result<R, PactError> {
        let id = self.contract_id(name)?;
        self.registry
            .with_contract(id, |contract| f(&self.system, contract))
            .map_err(|e| PactError::Config(e.to_string()))
    }

    fn state_detail(&self, name: &str) -> Result<String, PactError> {
        let id = self.contract_id(name)?;
        let state = self
            .registry
            .state(id)
            .ok_or_else(|| PactError::Config(format!("contract {name:?} vanished")))?;
        Ok(format!("state {state}"))
    }

    /// Apply one action, returning `(result, detail)`.
    fn apply(&mut self, action: &Action) -> Result<(String, String), PactError> {
        match action {
            Action::SignOn {
                contract,
                signer,
                party,
            } => {
                let signer_id = self.signer_id(signer)?;
                let party = *party;
                let outcome = self.on_contract(contract, |system, c| {
                    system.try_sign_on(c, signer_id, party).map(|()| c.signers(party).len())
                })?;
                Ok(match outcome {
                    Ok(count) => ("ok".into(), format!("{party} has {count} signer(s)")),
                    Err(err) => (err.name().into(), err.to_string()),
                })
            }
            Action::Sign { contract } => {
                let outcome = self.on_contract(contract, |system, c| system.try_sign_contract(c))?;
                self.transition_result(contract, outcome.map_err(|e| (e.name(), e.to_string())))
            }
            Action::Breach { contract, party } => {
                let party = *party;
                let outcome = self.on_contract(contract, |system, c| {
                    system.try_breach_contract(c, party)
                })?;
                self.transition_result(contract, outcome.map_err(|e| (e.name(), e.to_string())))
            }
            Action::CloseOut { contract } => {
                let outcome =
                    self.on_contract(contract, |system, c| system.try_close_out_contract(c))?;
                self.transition_result(contract, outcome.map_err(|e| (e.name(), e.to_string())))
            }
            Action::RetireSigner { signer } => {
                let id = self.signer_id(signer)?;
                Ok(if self.signers.retire(&id) {
                    ("ok".into(), format!("{signer} retired"))
                } else {
                    ("already_retired".into(), format!("{signer} was already retired"))
                })
            }
            Action::Satisfy {
                contract,
                criterion,
            } => {
                let book = self.book_mut(contract)?;
                Ok(match book.satisfy(*criterion) {
                    Ok(()) => ("ok".into(), format!("criterion #{criterion} satisfied")),
                    Err(err) => (err.name().into(), err.to_string()),
                })
            }
            Action::Trigger { contract, clause } => {
                let book = self.book_mut(contract)?;
                Ok(match book.trigger(*clause) {
                    Ok(()) => ("ok".into(), format!("clause #{clause} triggered")),
                    Err(err) => (err.name().into(), err.to_string()),
                })
            }
            Action::Evaluate { contract } => {
                let book = self
                    .books
                    .get(contract.as_str())
                    .ok_or_else(|| PactError::Config(format!("unknown contract {contract:?}")))?;
                let outcome =
                    self.on_contract(contract, |system, c| system.evaluate_clauses(c, book))?;
                match outcome {
                    Ok(outcome) => Ok((outcome.name().into(), self.state_detail(contract)?)),
                    Err(err) => Ok((err.name().into(), err.to_string())),
                }
            }
        }
    }

    fn transition_result(
        &self,
        contract: &str,
        outcome: Result<(), (&'static str, String)>,
    ) -> Result<(String, String), PactError> {
        match outcome {
            Ok(()) => Ok(("ok".into(), self.state_detail(contract)?)),
            Err((name, message)) => Ok((name.into(), message)),
        }
    }

    fn summaries(&self, scenario: &Scenario) -> Vec<ContractSummary> {
        let names = |ids: &[SignerId]| -> Vec<String> {
            ids.iter()
                .map(|id| {
                    self.signer_names
                        .get(id)
                        .cloned()
                        .unwrap_or_else(|| id.to_string())
                })
                .collect()
        };

        scenario
            .contracts
            .iter()
            .filter_map(|decl| {
                let id = self.contract_ids.get(&decl.name)?;
                let contract = self.registry.get(*id)?;
                Some(ContractSummary {
                    name: decl.name.clone(),
                    id: *id,
                    state: contract.state(),
                    party_a: names(contract.party_a()),
                    party_b: names(contract.party_b()),
                    transitions: contract.transitions().len(),
                })
            })
            .collect()
    }
}
