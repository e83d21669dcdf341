use crate::dispatch::entity::{
    AssemblyId, ClassId, DomainId, DomainScope, ModuleId, ProcessId, RawThread, ThreadId,
    ThreadScope,
};
use crate::dispatch::error::Error;
use crate::dispatch::notification::{payload, Notification, RawNotification};
use indexmap::IndexMap;
use log::debug;

#[derive(Clone, PartialEq, Debug)]
pub struct ProcessRecord {
    pub id: ProcessId,
}

#[derive(Clone, PartialEq, Debug)]
pub struct DomainRecord {
    pub id: DomainId,
    pub process: ProcessId,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ThreadRecord {
    pub id: ThreadId,
    /// Owning execution domain.
    pub domain: DomainId,
    pub name: Option<String>,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ModuleRecord {
    pub id: ModuleId,
    pub domain: DomainId,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct AssemblyRecord {
    pub id: AssemblyId,
    pub domain: DomainId,
    pub name: String,
}

#[derive(Clone, PartialEq, Debug)]
pub struct ClassRecord {
    pub id: ClassId,
    pub domain: DomainId,
    pub module: Option<ModuleId>,
}

/// Mirror of debugee entities known by native engine.
///
/// Model changes only as a side effect of lifecycle notifications (see [`ContextModel::apply`]),
/// all other users have a read-only access. Records are kept in insertion order.
#[derive(Default, Debug)]
pub struct ContextModel {
    processes: IndexMap<ProcessId, ProcessRecord>,
    domains: IndexMap<DomainId, DomainRecord>,
    threads: IndexMap<ThreadId, ThreadRecord>,
    modules: IndexMap<ModuleId, ModuleRecord>,
    assemblies: IndexMap<AssemblyId, AssemblyRecord>,
    classes: IndexMap<ClassId, ClassRecord>,
}

impl ContextModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lookup_process(&self, pid: ProcessId) -> Option<&ProcessRecord> {
        self.processes.get(&pid)
    }

    pub fn lookup_domain(&self, domain: DomainId) -> Option<&DomainRecord> {
        self.domains.get(&domain)
    }

    pub fn lookup_thread(&self, thread: ThreadId) -> Option<&ThreadRecord> {
        self.threads.get(&thread)
    }

    pub fn lookup_module(&self, module: ModuleId) -> Option<&ModuleRecord> {
        self.modules.get(&module)
    }

    pub fn lookup_assembly(&self, assembly: AssemblyId) -> Option<&AssemblyRecord> {
        self.assemblies.get(&assembly)
    }

    pub fn lookup_class(&self, class: ClassId) -> Option<&ClassRecord> {
        self.classes.get(&class)
    }

    pub fn processes(&self) -> impl Iterator<Item = &ProcessRecord> {
        self.processes.values()
    }

    pub fn domains_of(&self, pid: ProcessId) -> impl Iterator<Item = &DomainRecord> {
        self.domains.values().filter(move |d| d.process == pid)
    }

    pub fn threads_of(&self, domain: DomainId) -> impl Iterator<Item = &ThreadRecord> {
        self.threads.values().filter(move |t| t.domain == domain)
    }

    pub fn modules_of(&self, domain: DomainId) -> impl Iterator<Item = &ModuleRecord> {
        self.modules.values().filter(move |m| m.domain == domain)
    }

    /// Return true if engine reports a known thread in a known domain other than the recorded one.
    pub fn is_moved(&self, thread: &RawThread) -> bool {
        match (self.threads.get(&thread.id), thread.domain) {
            (Some(record), Some(domain)) => {
                record.domain != domain && self.domains.contains_key(&domain)
            }
            _ => false,
        }
    }

    /// Move a known thread into the domain engine reports for it.
    pub fn move_thread(&mut self, thread: RawThread) {
        let Some(domain) = thread.domain.filter(|d| self.domains.contains_key(d)) else {
            return;
        };
        if let Some(record) = self.threads.get_mut(&thread.id) {
            debug!(
                target: "context",
                "thread {} moved from domain {} to {domain}", record.id, record.domain
            );
            record.domain = domain;
        }
    }

    /// Return true if model knows nothing about any entity.
    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
            && self.domains.is_empty()
            && self.threads.is_empty()
            && self.modules.is_empty()
            && self.assemblies.is_empty()
            && self.classes.is_empty()
    }

    fn known_process(&self, pid: ProcessId) -> Result<ProcessId, Error> {
        self.processes
            .get(&pid)
            .map(|p| p.id)
            .ok_or(Error::UnknownProcess(pid))
    }

    fn domain_scope(&self, domain: DomainId) -> Result<DomainScope, Error> {
        let record = self.domains.get(&domain).ok_or(Error::UnknownDomain(domain))?;
        Ok(DomainScope {
            process: record.process,
            domain,
        })
    }

    /// Resolve context of a thread-scoped notification.
    ///
    /// Domain resolves as: explicit `domain` if supplied, else thread owning domain. Owning domain
    /// is the one engine reports for the thread, if engine reports nothing - the recorded one.
    ///
    /// # Arguments
    ///
    /// * `domain`: explicit execution domain, as supplied by engine
    /// * `thread`: thread handle
    /// * `must_be_known`: if true - thread must be already known by model
    pub fn thread_scope(
        &self,
        domain: Option<DomainId>,
        thread: RawThread,
        must_be_known: bool,
    ) -> Result<ThreadScope, Error> {
        let record = self.threads.get(&thread.id);
        if must_be_known && record.is_none() {
            return Err(Error::UnknownThread(thread.id));
        }

        let owning_domain = thread.domain.or(record.map(|t| t.domain));
        let domain = domain
            .or(owning_domain)
            .ok_or(Error::NoDomain(thread.id))?;
        let domain_scope = self.domain_scope(domain)?;

        Ok(ThreadScope {
            process: domain_scope.process,
            domain,
            thread: thread.id,
        })
    }

    /// Resolve raw notification into a typed one. Model is not changed.
    pub fn resolve(&self, raw: RawNotification) -> Result<Notification, Error> {
        let notification = match raw {
            RawNotification::BreakpointHit {
                domain,
                thread,
                breakpoint,
            } => Notification::BreakpointHit(payload::BreakpointHit {
                scope: self.thread_scope(domain, thread, true)?,
                breakpoint,
            }),
            RawNotification::BreakpointSetFailed {
                domain,
                thread,
                breakpoint,
                error_code,
            } => Notification::BreakpointSetFailed(payload::BreakpointSetFailed {
                scope: self.thread_scope(domain, thread, true)?,
                breakpoint,
                error_code,
            }),
            RawNotification::StepCompleted {
                domain,
                thread,
                stepper,
                reason,
            } => Notification::StepCompleted(payload::StepCompleted {
                scope: self.thread_scope(domain, thread, true)?,
                stepper,
                reason,
            }),
            RawNotification::Break { domain, thread } => Notification::Break(payload::Break {
                scope: self.thread_scope(domain, thread, true)?,
            }),
            RawNotification::ExceptionRaised {
                domain,
                thread,
                unhandled,
            } => Notification::ExceptionRaised(payload::ExceptionRaised {
                scope: self.thread_scope(domain, thread, true)?,
                unhandled,
            }),
            RawNotification::ExceptionContext {
                domain,
                thread,
                frame,
                offset,
                kind,
                flags,
            } => Notification::ExceptionContext(payload::ExceptionContext {
                scope: self.thread_scope(domain, thread, true)?,
                frame,
                offset,
                kind,
                flags,
            }),
            RawNotification::ExceptionUnwind {
                domain,
                thread,
                kind,
                flags,
            } => Notification::ExceptionUnwind(payload::ExceptionUnwind {
                scope: self.thread_scope(domain, thread, true)?,
                kind,
                flags,
            }),
            RawNotification::EvalCompleted {
                domain,
                thread,
                evaluation,
            } => Notification::EvalCompleted(payload::EvalCompleted {
                scope: self.thread_scope(domain, thread, true)?,
                evaluation,
            }),
            RawNotification::EvalFailed {
                domain,
                thread,
                evaluation,
            } => Notification::EvalFailed(payload::EvalFailed {
                scope: self.thread_scope(domain, thread, true)?,
                evaluation,
            }),
            RawNotification::ProcessCreated { process } => {
                if self.processes.contains_key(&process) {
                    return Err(Error::AlreadyKnown("process", process.to_string()));
                }
                Notification::ProcessCreated(payload::ProcessCreated { process })
            }
            RawNotification::ProcessExited { process } => {
                Notification::ProcessExited(payload::ProcessExited {
                    process: self.known_process(process)?,
                })
            }
            RawNotification::ThreadCreated { domain, thread } => {
                if self.threads.contains_key(&thread.id) {
                    return Err(Error::AlreadyKnown("thread", thread.id.to_string()));
                }
                Notification::ThreadCreated(payload::ThreadCreated {
                    scope: self.thread_scope(domain, thread, false)?,
                })
            }
            RawNotification::ThreadExited { domain, thread } => {
                Notification::ThreadExited(payload::ThreadExited {
                    scope: self.thread_scope(domain, thread, true)?,
                })
            }
            RawNotification::ThreadRenamed {
                domain,
                thread,
                name,
            } => Notification::ThreadRenamed(payload::ThreadRenamed {
                scope: self.thread_scope(domain, thread, true)?,
                name,
            }),
            RawNotification::DomainCreated {
                process,
                domain,
                name,
            } => {
                if self.domains.contains_key(&domain) {
                    return Err(Error::AlreadyKnown("execution domain", domain.to_string()));
                }
                Notification::DomainCreated(payload::DomainCreated {
                    scope: DomainScope {
                        process: self.known_process(process)?,
                        domain,
                    },
                    name,
                })
            }
            RawNotification::DomainExited { domain } => {
                Notification::DomainExited(payload::DomainExited {
                    scope: self.domain_scope(domain)?,
                })
            }
            RawNotification::DomainRenamed { domain, name } => {
                Notification::DomainRenamed(payload::DomainRenamed {
                    scope: self.domain_scope(domain)?,
                    name,
                })
            }
            RawNotification::ModuleLoaded {
                domain,
                module,
                name,
            } => {
                if self.modules.contains_key(&module) {
                    return Err(Error::AlreadyKnown("module", module.to_string()));
                }
                Notification::ModuleLoaded(payload::ModuleLoaded {
                    scope: self.domain_scope(domain)?,
                    module,
                    name,
                })
            }
            RawNotification::ModuleUnloaded { domain, module } => {
                let scope = self.domain_scope(domain)?;
                self.modules
                    .get(&module)
                    .filter(|m| m.domain == domain)
                    .ok_or(Error::UnknownModule(module))?;
                Notification::ModuleUnloaded(payload::ModuleUnloaded { scope, module })
            }
            RawNotification::ClassLoaded {
                domain,
                class,
                module,
            } => {
                if self.classes.contains_key(&class) {
                    return Err(Error::AlreadyKnown("class", class.to_string()));
                }
                let scope = self.domain_scope(domain)?;
                if let Some(module) = module {
                    self.modules
                        .get(&module)
                        .filter(|m| m.domain == domain)
                        .ok_or(Error::UnknownModule(module))?;
                }
                Notification::ClassLoaded(payload::ClassLoaded {
                    scope,
                    class,
                    module,
                })
            }
            RawNotification::ClassUnloaded { domain, class } => {
                let scope = self.domain_scope(domain)?;
                self.classes
                    .get(&class)
                    .filter(|c| c.domain == domain)
                    .ok_or(Error::UnknownClass(class))?;
                Notification::ClassUnloaded(payload::ClassUnloaded { scope, class })
            }
            RawNotification::AssemblyLoaded {
                domain,
                assembly,
                name,
            } => {
                if self.assemblies.contains_key(&assembly) {
                    return Err(Error::AlreadyKnown("assembly", assembly.to_string()));
                }
                Notification::AssemblyLoaded(payload::AssemblyLoaded {
                    scope: self.domain_scope(domain)?,
                    assembly,
                    name,
                })
            }
            RawNotification::AssemblyUnloaded { domain, assembly } => {
                let scope = self.domain_scope(domain)?;
                self.assemblies
                    .get(&assembly)
                    .filter(|a| a.domain == domain)
                    .ok_or(Error::UnknownAssembly(assembly))?;
                Notification::AssemblyUnloaded(payload::AssemblyUnloaded { scope, assembly })
            }
            RawNotification::ModuleSymbolsUpdated {
                domain,
                module,
                symbols,
            } => {
                let scope = self.domain_scope(domain)?;
                self.modules
                    .get(&module)
                    .filter(|m| m.domain == domain)
                    .ok_or(Error::UnknownModule(module))?;
                Notification::ModuleSymbolsUpdated(payload::ModuleSymbolsUpdated {
                    scope,
                    module,
                    symbols,
                })
            }
            RawNotification::DebuggerError {
                process,
                hresult,
                error_code,
            } => Notification::DebuggerError(payload::DebuggerError {
                process: self.known_process(process)?,
                hresult,
                error_code,
            }),
            RawNotification::LogMessage {
                domain,
                thread,
                level,
                switch_name,
                message,
            } => Notification::LogMessage(payload::LogMessage {
                scope: self.thread_scope(domain, thread, true)?,
                level,
                switch_name,
                message,
            }),
            RawNotification::LogSwitchChanged {
                domain,
                thread,
                level,
                reason,
                switch_name,
                parent_name,
            } => Notification::LogSwitchChanged(payload::LogSwitchChanged {
                scope: self.thread_scope(domain, thread, true)?,
                level,
                reason,
                switch_name,
                parent_name,
            }),
            RawNotification::ToolNotification {
                tool_id,
                thread,
                process,
                payload,
            } => {
                let process = self.known_process(process)?;
                if let Some(thread) = thread {
                    self.threads
                        .get(&thread)
                        .and_then(|t| self.domains.get(&t.domain))
                        .filter(|d| d.process == process)
                        .ok_or(Error::UnknownThread(thread))?;
                }
                Notification::ToolNotification(payload::ToolNotification {
                    tool_id,
                    thread,
                    process,
                    payload,
                })
            }
            RawNotification::ControlCTrap { process } => {
                Notification::ControlCTrap(payload::ControlCTrap {
                    process: self.known_process(process)?,
                })
            }
            RawNotification::FunctionRemapOpportunity {
                domain,
                thread,
                old_function,
                new_function,
                old_offset,
            } => Notification::FunctionRemapOpportunity(payload::FunctionRemapOpportunity {
                scope: self.thread_scope(domain, thread, true)?,
                old_function,
                new_function,
                old_offset,
            }),
            RawNotification::FunctionRemapCompleted {
                domain,
                thread,
                function,
            } => Notification::FunctionRemapCompleted(payload::FunctionRemapCompleted {
                scope: self.thread_scope(domain, thread, true)?,
                function,
            }),
        };

        Ok(notification)
    }

    /// Mirror lifecycle notification into the model. Notifications must be resolved against
    /// this model first, non-lifecycle notifications are ignored.
    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::ProcessCreated(n) => {
                debug!(target: "context", "insert process {}", n.process);
                self.processes
                    .insert(n.process, ProcessRecord { id: n.process });
            }
            Notification::ProcessExited(n) => {
                debug!(target: "context", "remove process {} with all its entities", n.process);
                let domains: Vec<_> = self.domains_of(n.process).map(|d| d.id).collect();
                domains.into_iter().for_each(|d| self.remove_domain(d));
                self.processes.shift_remove(&n.process);
            }
            Notification::DomainCreated(n) => {
                debug!(target: "context", "insert {}", n.scope);
                self.domains.insert(
                    n.scope.domain,
                    DomainRecord {
                        id: n.scope.domain,
                        process: n.scope.process,
                        name: n.name.clone(),
                    },
                );
            }
            Notification::DomainExited(n) => {
                debug!(target: "context", "remove {} with all its entities", n.scope);
                self.remove_domain(n.scope.domain);
            }
            Notification::DomainRenamed(n) => {
                if let (Some(record), Some(name)) =
                    (self.domains.get_mut(&n.scope.domain), n.name.as_ref())
                {
                    record.name = name.clone();
                }
            }
            Notification::ThreadCreated(n) => {
                debug!(target: "context", "insert {}", n.scope);
                self.threads.insert(
                    n.scope.thread,
                    ThreadRecord {
                        id: n.scope.thread,
                        domain: n.scope.domain,
                        name: None,
                    },
                );
            }
            Notification::ThreadExited(n) => {
                debug!(target: "context", "remove {}", n.scope);
                self.threads.shift_remove(&n.scope.thread);
            }
            Notification::ThreadRenamed(n) => {
                if let (Some(record), Some(name)) =
                    (self.threads.get_mut(&n.scope.thread), n.name.as_ref())
                {
                    record.name = Some(name.clone());
                }
            }
            Notification::ModuleLoaded(n) => {
                self.modules.insert(
                    n.module,
                    ModuleRecord {
                        id: n.module,
                        domain: n.scope.domain,
                        name: n.name.clone(),
                    },
                );
            }
            Notification::ModuleUnloaded(n) => {
                debug!(target: "context", "remove module {} with its classes", n.module);
                self.classes.retain(|_, c| c.module != Some(n.module));
                self.modules.shift_remove(&n.module);
            }
            Notification::AssemblyLoaded(n) => {
                self.assemblies.insert(
                    n.assembly,
                    AssemblyRecord {
                        id: n.assembly,
                        domain: n.scope.domain,
                        name: n.name.clone(),
                    },
                );
            }
            Notification::AssemblyUnloaded(n) => {
                self.assemblies.shift_remove(&n.assembly);
            }
            Notification::ClassLoaded(n) => {
                self.classes.insert(
                    n.class,
                    ClassRecord {
                        id: n.class,
                        domain: n.scope.domain,
                        module: n.module,
                    },
                );
            }
            Notification::ClassUnloaded(n) => {
                self.classes.shift_remove(&n.class);
            }
            _ => {}
        }
    }

    fn remove_domain(&mut self, domain: DomainId) {
        self.threads.retain(|_, t| t.domain != domain);
        self.modules.retain(|_, m| m.domain != domain);
        self.assemblies.retain(|_, a| a.domain != domain);
        self.classes.retain(|_, c| c.domain != domain);
        self.domains.shift_remove(&domain);
    }
}
