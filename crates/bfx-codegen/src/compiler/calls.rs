use super::*;

impl Compiler {
    /// Expand a call inline: evaluate the arguments in the caller, bind them
    /// to fresh parameters in the callee's scope, run the body, and hand the
    /// return variable (if any) back to the caller as a temporary.
    pub fn call(&mut self, name: &str, args: &[Instr]) -> Result<Option<Place>, CompileError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| self.error(ErrorKind::UnknownFunction(name.to_string())))?;

        if self.functions.is_active(name) {
            return Err(self.error(ErrorKind::RecursiveCall(name.to_string())));
        }
        if function.params.len() != args.len() {
            return Err(self.error(ErrorKind::ArityMismatch {
                function: name.to_string(),
                expected: function.params.len(),
                got: args.len(),
            }));
        }

        let mut values = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            let value = arg.evaluate(self)?.ok_or_else(|| {
                self.error(ErrorKind::VoidArgument {
                    function: name.to_string(),
                    index,
                })
            })?;
            values.push(value);
        }

        for (param, value) in function.params.iter().zip(&values) {
            let addr = self
                .memory
                .allocate(param, name, value.ty.clone())
                .ok_or_else(|| self.error(ErrorKind::IdentifierRedefinition(param.clone())))?;
            self.bf_assign_n(addr, value.addr, value.size());
        }

        debug!(function = name, depth = self.functions.depth(), "enter");
        let caller_location = self.location;
        self.functions.enter(name);
        function.body.evaluate(self)?;
        self.functions.leave();
        self.location = caller_location;
        debug!(function = name, "leave");

        let result = match &function.return_var {
            Some(variable) => {
                let addr = self.memory.find_local(variable, name).ok_or_else(|| {
                    self.error(ErrorKind::MissingReturnVariable {
                        function: name.to_string(),
                        variable: variable.clone(),
                    })
                })?;
                let ty = self.memory.type_of(addr);
                let caller = self.functions.current_scope().to_string();
                self.memory.rename(addr, "", &caller);
                self.memory.mark_as_temp(addr);
                Some(Place::new(addr, ty))
            }
            None => None,
        };

        if self.functions.depth() == 0 {
            self.record_symbols(name);
        }
        self.memory.free_locals(name);
        Ok(result)
    }

    /// Snapshot named cells of the outermost call and the globals before
    /// the call's locals are released.
    fn record_symbols(&mut self, scope: &str) {
        for (identifier, addr) in self.memory.named("") {
            self.symbols.insert(identifier, addr);
        }
        for (identifier, addr) in self.memory.named(scope) {
            self.symbols.insert(identifier, addr);
        }
    }
}
