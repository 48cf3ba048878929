/// Terminal host for the chocolate-bar demo: crossterm input, ASCII output
use crossterm::{
    cursor,
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self},
};
use std::cell::Cell;
use std::io::{stdout, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};
use wrapspin_core::{
    Camera, Controller, ControllerConfig, FrameDriver, ProjectionMode, Result, SceneGraph,
};

pub mod renderer;

pub use renderer::AsciiRenderer;

/// Approximate pixel size of a terminal cell, used to map columns to pointer units
pub const CELL_WIDTH_PX: f64 = 8.0;
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Startup options for [`TerminalApp`]
#[derive(Debug, Clone)]
pub struct AppOptions {
    pub config: ControllerConfig,
    pub unwrapped: bool,
    pub fps: u32,
    pub projection: ProjectionMode,
    pub color: bool,
}

impl Default for AppOptions {
    fn default() -> Self {
        Self {
            config: ControllerConfig::default(),
            unwrapped: false,
            fps: 30,
            projection: ProjectionMode::Perspective,
            color: true,
        }
    }
}

/// Main application struct for terminal rendering
pub struct TerminalApp {
    driver: FrameDriver<SceneGraph>,
    camera: Camera,
    renderer: AsciiRenderer,
    unwrapped: bool,
    interacting: Rc<Cell<bool>>,
    running: bool,
    clock: Instant,
    target_frame_time: Duration,
    last_fps_sample: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(options: AppOptions) -> Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self::with_size(options, width, height))
    }

    /// Build the app for a known terminal size, without touching the terminal.
    pub fn with_size(options: AppOptions, width: u16, height: u16) -> Self {
        let clock = Instant::now();
        let mut controller = Controller::new(options.config, options.unwrapped, 0.0);
        controller.set_viewport(width as f64 * CELL_WIDTH_PX, height as f64 * CELL_HEIGHT_PX);

        let interacting = Rc::new(Cell::new(false));
        let flag = Rc::clone(&interacting);
        controller.set_interaction_listener(move |active| flag.set(active));

        let mut camera = Camera::new(width as f32, height as f32 * 2.0);
        camera.mode = options.projection;

        let mut renderer = AsciiRenderer::new(width as usize, height as usize);
        renderer.set_color(options.color);

        Self {
            driver: FrameDriver::new(controller, SceneGraph::new()),
            camera,
            renderer,
            unwrapped: options.unwrapped,
            interacting,
            running: true,
            clock,
            target_frame_time: Duration::from_secs(1) / options.fps.max(1),
            last_fps_sample: clock,
            frame_count: 0,
            fps: 0.0,
        }
    }

    pub fn controller(&self) -> &Controller {
        self.driver.controller()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_interacting(&self) -> bool {
        self.interacting.get()
    }

    pub fn run(&mut self) -> Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            stdout(),
            terminal::EnterAlternateScreen,
            cursor::Hide,
            EnableMouseCapture,
            EnableFocusChange
        )?;
        log::info!("terminal session started");

        let result = self.main_loop();

        // Cleanup
        self.driver.stop();
        execute!(
            stdout(),
            DisableFocusChange,
            DisableMouseCapture,
            terminal::LeaveAlternateScreen,
            cursor::Show
        )?;
        terminal::disable_raw_mode()?;
        log::info!("terminal session ended");

        result
    }

    fn main_loop(&mut self) -> Result<()> {
        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::ZERO)? {
                let event = event::read()?;
                self.handle_event(event);
            }
            if !self.running {
                break;
            }

            // Update
            self.driver.tick(self.clock.elapsed().as_secs_f64());

            // Render
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < self.target_frame_time {
                std::thread::sleep(self.target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            let window = now - self.last_fps_sample;
            if window.as_secs() >= 1 {
                self.fps = self.frame_count as f32 / window.as_secs_f32();
                self.frame_count = 0;
                self.last_fps_sample = now;
            }
        }

        Ok(())
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(width, height) => self.resize(width, height),
            Event::FocusLost => self.driver.controller_mut().pointer_leave(),
            _ => {}
        }
    }

    fn handle_key(&mut self, KeyEvent { code, modifiers, kind, .. }: KeyEvent) {
        if kind != KeyEventKind::Press {
            return;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.running = false;
            }
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                self.running = false;
            }
            KeyCode::Char(' ') | KeyCode::Char('u') => {
                self.unwrapped = !self.unwrapped;
                self.driver.controller_mut().set_unwrapped(self.unwrapped);
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, MouseEvent { kind, column, .. }: MouseEvent) {
        let x = column as f64 * CELL_WIDTH_PX;
        let controller = self.driver.controller_mut();
        match kind {
            MouseEventKind::Down(MouseButton::Left) => controller.pointer_down(x),
            MouseEventKind::Drag(MouseButton::Left) => controller.pointer_move(x),
            MouseEventKind::Up(MouseButton::Left) => controller.pointer_up(),
            _ => {}
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        log::debug!("terminal resized to {width}x{height}");
        self.renderer.resize(width as usize, height as usize);
        self.camera.set_viewport(width as f32, height as f32 * 2.0);
        self.driver
            .controller_mut()
            .set_viewport(width as f64 * CELL_WIDTH_PX, height as f64 * CELL_HEIGHT_PX);
    }

    /// Status line: frame rate, manual vs automatic mode, wrapper state.
    pub fn status_line(&self) -> String {
        let mode = if self.is_interacting() { "Manual" } else { "Auto" };
        let progress = self.driver.controller().state().unwrap_progress;
        let wrapper = if self.unwrapped { "Open" } else { "Closed" };
        format!(
            "wrapspin | FPS: {:.1} | {mode} | Wrapper: {wrapper} {:>3.0}% | Drag=Rotate Space=Unwrap Q=Quit",
            self.fps,
            progress * 100.0
        )
    }

    fn render(&mut self) -> Result<()> {
        // Clear renderer
        self.renderer.clear();

        // Render scene
        self.renderer.render_scene(self.driver.surface(), &self.camera);

        // Output to terminal
        let mut stdout = stdout();
        queue!(stdout, cursor::MoveTo(0, 0))?;

        self.renderer.draw(&mut stdout)?;

        // Draw UI overlay
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(self.status_line()),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;
    use wrapspin_core::InteractionPhase;

    fn app() -> TerminalApp {
        TerminalApp::with_size(AppOptions::default(), 80, 24)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row: 10,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn test_space_toggles_unwrap_target() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char(' ')));
        assert_eq!(app.controller().state().unwrap_target, 1.0);
        app.handle_event(key(KeyCode::Char('u')));
        assert_eq!(app.controller().state().unwrap_target, 0.0);
    }

    #[test]
    fn test_mouse_drag_rotates_and_reports_interaction() {
        let mut app = app();
        let yaw = app.controller().state().yaw;

        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10));
        assert!(app.is_interacting());
        assert!(app.status_line().contains("Manual"));

        app.handle_event(mouse(MouseEventKind::Drag(MouseButton::Left), 15));
        app.handle_event(mouse(MouseEventKind::Up(MouseButton::Left), 15));
        assert!(!app.is_interacting());
        assert_eq!(app.controller().phase(), InteractionPhase::IdlePaused);

        let expected = yaw + 5.0 * CELL_WIDTH_PX * 0.35;
        assert!((app.controller().state().yaw - expected).abs() < 1e-9);
    }

    #[test]
    fn test_focus_loss_ends_drag() {
        let mut app = app();
        app.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 10));
        app.handle_event(Event::FocusLost);
        assert_eq!(app.controller().phase(), InteractionPhase::IdlePaused);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_event(key(KeyCode::Char('x')));
        assert!(app.is_running());
        app.handle_event(key(KeyCode::Esc));
        assert!(!app.is_running());
    }

    #[test]
    fn test_resize_refits_scale() {
        let mut app = app();
        app.handle_event(Event::Resize(130, 53));
        assert!((app.controller().state().scale - 2.0).abs() < 1e-9);
    }
}
