//! The instruction dispatch loop: context switches, reads, writes, exits, and the page-fault
//! handler that ties the frame table, free pool and pager together.

use std::io::{self, Write};

use log::trace;

use crate::config;
use crate::frame::{FrameId, FrameTable, FreePool};
use crate::pager::Pager;
use crate::process::{Pid, Process};

/// One line of the input instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Context(Pid),
    Read(u8),
    Write(u8),
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
}

impl Instruction {
    #[must_use]
    pub const fn new(opcode: Opcode) -> Self {
        Self { opcode }
    }
}

/// What happened to a frame's ownership when it was unmapped.
///
/// The caller decides what to do with the frame from this return value instead of reading a flag
/// the unmap call would otherwise have to mutate on the way out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmapOutcome {
    /// A dirty anonymous page was swapped out; the frame is not reusable until evicted again.
    Swapped,
    /// The frame was reclaimed on process exit and can be pushed straight back to the free pool.
    Reclaimed,
    /// A clean page was dropped with no swap traffic; on-exit reclamation still applies at the
    /// call site, but a live unmap leaves the frame to the pager.
    Untouched,
}

/// Owns every piece of simulation state and drives the instruction loop.
///
/// A single owner holds the scheduling unit (here, the current process) and steps it forward one
/// instruction at a time, with no interior mutability and no locking, since the simulation is
/// single-threaded end to end.
pub struct Simulator {
    processes: Vec<Process>,
    frame_table: FrameTable,
    free_pool: FreePool,
    pager: Pager,
    current: Option<Pid>,
    inst_count: u64,
    ctx_switches: u64,
    process_exits: u64,
    cost: u64,
}

impl Simulator {
    #[must_use]
    pub fn new(processes: Vec<Process>, frame_count: usize, pager: Pager) -> Self {
        Self {
            processes,
            frame_table: FrameTable::new(frame_count),
            free_pool: FreePool::filled(frame_count),
            pager,
            current: None,
            inst_count: 0,
            ctx_switches: 0,
            process_exits: 0,
            cost: 0,
        }
    }

    #[must_use]
    pub fn processes(&self) -> &[Process] {
        &self.processes
    }

    #[must_use]
    pub const fn frame_table(&self) -> &FrameTable {
        &self.frame_table
    }

    #[must_use]
    pub const fn inst_count(&self) -> u64 {
        self.inst_count
    }

    #[must_use]
    pub const fn ctx_switches(&self) -> u64 {
        self.ctx_switches
    }

    #[must_use]
    pub const fn process_exits(&self) -> u64 {
        self.process_exits
    }

    #[must_use]
    pub const fn cost(&self) -> u64 {
        self.cost
    }

    /// Runs every instruction in order, writing the mandated trace to `trace`.
    ///
    /// # Panics
    /// Panics on any invariant violation in the instruction stream: an out-of-range pid on a
    /// context switch, or dereferencing memory with no current process. The input is trusted;
    /// see the crate-level error taxonomy.
    pub fn run(&mut self, instructions: &[Instruction], trace: &mut impl Write) -> io::Result<()> {
        for instruction in instructions {
            self.inst_count += 1;
            self.print_instruction(*instruction, trace)?;

            match instruction.opcode {
                Opcode::Context(pid) => self.do_context_switch(pid),
                Opcode::Read(vpage) => self.do_access(vpage, false, trace)?,
                Opcode::Write(vpage) => self.do_access(vpage, true, trace)?,
                Opcode::Exit => self.do_exit(trace)?,
            }
        }
        Ok(())
    }

    fn print_instruction(
        &self,
        instruction: Instruction,
        trace: &mut impl Write,
    ) -> io::Result<()> {
        let (opcode_char, arg) = match instruction.opcode {
            Opcode::Context(pid) => ('c', pid.get()),
            Opcode::Read(vpage) => ('r', u32::from(vpage)),
            Opcode::Write(vpage) => ('w', u32::from(vpage)),
            Opcode::Exit => ('e', 0),
        };
        writeln!(trace, "{}: ==> {} {}", self.inst_count, opcode_char, arg)
    }

    fn current_process(&mut self) -> &mut Process {
        let pid = self
            .current
            .expect("memory instruction with no current process");
        &mut self.processes[pid.get() as usize]
    }

    fn do_context_switch(&mut self, pid: Pid) {
        assert!(
            (pid.get() as usize) < self.processes.len(),
            "context switch to out-of-range pid"
        );
        self.current = Some(pid);
        self.cost += config::COST_CTX_SWITCH;
        self.ctx_switches += 1;
    }

    fn do_access(&mut self, vpage: u8, is_write: bool, trace: &mut impl Write) -> io::Result<()> {
        self.cost += if is_write {
            config::COST_WRITE
        } else {
            config::COST_READ
        };

        let pid = self.current.expect("memory instruction with no current process");
        if !self.processes[pid.get() as usize].pte(vpage).valid() {
            if self.processes[pid.get() as usize].vma_for(vpage).is_none() {
                writeln!(trace, " SEGV")?;
                self.cost += config::COST_SEGV;
                self.processes[pid.get() as usize].counters_mut().segv += 1;
                return Ok(());
            }
            self.handle_page_fault(pid, vpage, trace)?;
        }

        let proc = &mut self.processes[pid.get() as usize];
        proc.pte_mut(vpage).set_referenced(true);

        if is_write {
            let write_protected = proc
                .vma_for(vpage)
                .expect("page is valid, so its VMA must still exist")
                .write_protected();
            proc.pte_mut(vpage).set_write_protect(write_protected);
            if write_protected {
                writeln!(trace, " SEGPROT")?;
                self.cost += config::COST_SEGPROT;
                proc.counters_mut().segprot += 1;
            } else {
                proc.pte_mut(vpage).set_modified(true);
            }
        }
        Ok(())
    }

    fn handle_page_fault(
        &mut self,
        pid: Pid,
        vpage: u8,
        trace: &mut impl Write,
    ) -> io::Result<()> {
        let frame_id = match self.free_pool.pop() {
            Some(id) => id,
            None => {
                self.pager
                    .select_victim(&mut self.frame_table, &mut self.processes, self.inst_count)
            }
        };

        if !self.frame_table.get(frame_id).is_free() {
            let (owner_pid, owner_vpage) = self
                .frame_table
                .get(frame_id)
                .owner()
                .expect("non-free frame always has an owner");
            self.cost += config::COST_UNMAP;
            let outcome = self.unmap(owner_pid, owner_vpage, frame_id, false, trace)?;
            debug_assert_ne!(outcome, UnmapOutcome::Reclaimed, "live unmap never reclaims");
        }

        self.cost += config::COST_MAP;
        self.map(pid, vpage, frame_id, trace)?;

        self.processes[pid.get() as usize]
            .pte_mut(vpage)
            .map_to(frame_id.get());
        Ok(())
    }

    /// Fills a freshly acquired frame for `(pid, vpage)` and emits the `MAP`/fill trace lines.
    fn map(&mut self, pid: Pid, vpage: u8, frame_id: FrameId, trace: &mut impl Write) -> io::Result<()> {
        let proc = &mut self.processes[pid.get() as usize];
        let vma = proc
            .vma_for(vpage)
            .expect("page fault only happens inside a VMA");

        if vma.file_mapped() {
            writeln!(trace, " FIN")?;
            self.cost += config::COST_FIN;
            proc.counters_mut().fins += 1;
            proc.pte_mut(vpage).set_modified(false);
        } else if proc.pte(vpage).pagedout() {
            writeln!(trace, " IN")?;
            self.cost += config::COST_IN;
            proc.counters_mut().ins += 1;
            proc.pte_mut(vpage).set_modified(false);
        } else {
            writeln!(trace, " ZERO")?;
            self.cost += config::COST_ZERO;
            proc.counters_mut().zeros += 1;
        }

        self.frame_table
            .assign(frame_id, pid, vpage, self.inst_count - 1);
        writeln!(trace, " MAP {}", frame_id)?;
        proc.counters_mut().maps += 1;
        Ok(())
    }

    /// Evicts whatever `(pid, vpage)` currently occupies `frame_id`.
    fn unmap(
        &mut self,
        pid: Pid,
        vpage: u8,
        frame_id: FrameId,
        on_exit: bool,
        trace: &mut impl Write,
    ) -> io::Result<UnmapOutcome> {
        writeln!(trace, " UNMAP {}:{}", pid, vpage)?;
        let proc = &mut self.processes[pid.get() as usize];
        proc.counters_mut().unmaps += 1;

        let vma = proc.vma_for(vpage).expect("unmapped page must have a VMA");
        let file_mapped = vma.file_mapped();
        let modified = proc.pte(vpage).modified();
        let mut swapped = false;

        if modified {
            if file_mapped {
                writeln!(trace, " FOUT")?;
                self.cost += config::COST_FOUT;
                proc.counters_mut().fouts += 1;
            } else if !on_exit {
                writeln!(trace, " OUT")?;
                self.cost += config::COST_OUT;
                proc.counters_mut().outs += 1;
                proc.pte_mut(vpage).set_pagedout(true);
                swapped = true;
            }
        }

        // A dirty file-mapped page always goes out as FOUT and is never reclaimed into the
        // free pool, even on exit; every other on_exit page is reclaimed.
        let reclaim_on_exit = on_exit && !(file_mapped && modified);
        let outcome = if reclaim_on_exit {
            proc.pte_mut(vpage).set_pagedout(false);
            UnmapOutcome::Reclaimed
        } else if swapped {
            UnmapOutcome::Swapped
        } else {
            UnmapOutcome::Untouched
        };

        proc.pte_mut(vpage).unmap();
        self.frame_table.release(frame_id);
        Ok(outcome)
    }

    fn do_exit(&mut self, trace: &mut impl Write) -> io::Result<()> {
        let pid = self
            .current
            .expect("exit instruction with no current process");
        self.process_exits += 1;
        self.cost += config::COST_EXIT;
        writeln!(trace, "EXIT current process {}", pid)?;

        for vpage in 0..crate::pte::PAGES_PER_PROCESS as u8 {
            let valid = self.processes[pid.get() as usize].pte(vpage).valid();
            if valid {
                let frame_id = FrameId::new(self.processes[pid.get() as usize].pte(vpage).phys_frame());
                self.cost += config::COST_UNMAP;
                let outcome = self.unmap(pid, vpage, frame_id, true, trace)?;
                if matches!(outcome, UnmapOutcome::Reclaimed) {
                    self.free_pool.push(frame_id);
                }
            } else {
                self.processes[pid.get() as usize]
                    .pte_mut(vpage)
                    .set_pagedout(false);
            }
        }

        self.current = None;
        trace!("process {} exited after {} instructions", pid, self.inst_count);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pager::Pager;
    use crate::vma::Vma;

    fn single_process(vmas: Vec<Vma>) -> Vec<Process> {
        vec![Process::new(Pid::new(0), vmas)]
    }

    fn run(sim: &mut Simulator, ops: &[Opcode]) -> String {
        let instructions: Vec<Instruction> = ops.iter().copied().map(Instruction::new).collect();
        let mut trace = Vec::new();
        sim.run(&instructions, &mut trace).unwrap();
        String::from_utf8(trace).unwrap()
    }

    #[test]
    fn zero_fill_on_first_read() {
        let processes = single_process(vec![Vma::new(0, 0, 9, false, false)]);
        let mut sim = Simulator::new(processes, 4, Pager::fifo());
        let trace = run(
            &mut sim,
            &[Opcode::Context(Pid::new(0)), Opcode::Read(2)],
        );
        assert!(trace.contains(" ZERO"));
        assert!(trace.contains(" MAP 0"));
        assert_eq!(sim.processes()[0].counters().zeros, 1);
    }

    #[test]
    fn segv_outside_any_vma() {
        let processes = single_process(vec![Vma::new(0, 0, 2, false, false)]);
        let mut sim = Simulator::new(processes, 4, Pager::fifo());
        let trace = run(
            &mut sim,
            &[Opcode::Context(Pid::new(0)), Opcode::Read(10)],
        );
        assert!(trace.contains(" SEGV"));
        assert_eq!(sim.processes()[0].counters().segv, 1);
        assert!(!sim.processes()[0].pte(10).valid());
    }

    #[test]
    fn write_protected_vma_segprots_without_setting_modified() {
        let processes = single_process(vec![Vma::new(0, 0, 2, true, false)]);
        let mut sim = Simulator::new(processes, 4, Pager::fifo());
        let trace = run(
            &mut sim,
            &[Opcode::Context(Pid::new(0)), Opcode::Write(1)],
        );
        assert!(trace.contains(" SEGPROT"));
        assert_eq!(sim.processes()[0].counters().segprot, 1);
        assert!(!sim.processes()[0].pte(1).modified());
    }

    #[test]
    fn out_then_in_cycle_with_a_single_frame() {
        let processes = single_process(vec![Vma::new(0, 0, 9, false, false)]);
        let mut sim = Simulator::new(processes, 1, Pager::fifo());
        let trace = run(
            &mut sim,
            &[
                Opcode::Context(Pid::new(0)),
                Opcode::Write(0),
                Opcode::Write(1),
            ],
        );
        assert!(trace.contains(" OUT"));
        assert!(trace.contains(" IN"));
        assert_eq!(sim.processes()[0].counters().outs, 1);
        assert_eq!(sim.processes()[0].counters().ins, 1);
    }

    #[test]
    fn file_mapped_vma_uses_fin_and_fout() {
        let processes = single_process(vec![Vma::new(0, 0, 9, false, true)]);
        let mut sim = Simulator::new(processes, 1, Pager::fifo());
        let trace = run(
            &mut sim,
            &[
                Opcode::Context(Pid::new(0)),
                Opcode::Write(0),
                Opcode::Write(1),
            ],
        );
        assert!(trace.contains(" FIN"));
        assert!(trace.contains(" FOUT"));
        assert_eq!(sim.processes()[0].counters().fins, 2);
        assert_eq!(sim.processes()[0].counters().fouts, 1);
    }

    #[test]
    fn exit_reclaims_clean_anonymous_frames_into_the_free_pool() {
        let processes = single_process(vec![Vma::new(0, 0, 9, false, false)]);
        let mut sim = Simulator::new(processes, 2, Pager::fifo());
        let trace = run(
            &mut sim,
            &[
                Opcode::Context(Pid::new(0)),
                Opcode::Read(0),
                Opcode::Exit,
            ],
        );
        assert!(trace.contains("EXIT current process 0"));
        assert_eq!(sim.process_exits(), 1);
        assert!(sim.frame_table().get(FrameId::new(0)).is_free());
    }

    #[test]
    fn running_twice_produces_identical_traces() {
        let ops = [
            Opcode::Context(Pid::new(0)),
            Opcode::Write(0),
            Opcode::Read(1),
            Opcode::Exit,
        ];
        let processes_a = single_process(vec![Vma::new(0, 0, 9, false, false)]);
        let processes_b = single_process(vec![Vma::new(0, 0, 9, false, false)]);
        let mut sim_a = Simulator::new(processes_a, 2, Pager::fifo());
        let mut sim_b = Simulator::new(processes_b, 2, Pager::fifo());
        assert_eq!(run(&mut sim_a, &ops), run(&mut sim_b, &ops));
    }
}
