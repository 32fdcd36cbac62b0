/*!
# Deferred Shading

Core of a deferred shading renderer: G-buffer lifecycle and multi-pass
light accumulation.

Scene geometry is rendered once (by the host) into three intermediate
buffers encoding per-pixel material and geometric attributes. Lighting is
then applied one light at a time, each light an additive draw into a single
result buffer, which is finally composited onto the display.

The crate talks to the GPU only through backend traits, so it runs on any
backend implementing them.

## Architecture

- **GraphicsDevice** / **CommandList**: backend factory and draw recording traits
- **MultiTargetBufferSet**: fixed-count group of equally sized render targets
- **AccumulationPassDriver**: per-light draw protocol (directional, point)
- **ScreenQuadEmitter**: full-screen quad with backend-dependent UV convention
- **Compositor**: result buffer to display
- **DeferredPipeline**: per-frame state machine tying it all together

## Frame

```text
begin_frame()      resize buffer sets, bind G-buffer + shared depth
  (host geometry pass)
render_lighting()  clear result, directional lights, point lights, composite
end_frame()        frame statistics
```
*/

// Internal modules
mod error;
pub mod log;
pub mod device;
pub mod target;
pub mod lighting;
pub mod pipeline;

// Main deferred namespace module
pub mod deferred {
    // Error types
    pub use crate::error::{Error, Result};

    // Pipeline entry point
    pub use crate::pipeline::{DeferredPipeline, PipelineConfig};

    // Backend traits
    pub use crate::device::{CommandList, GraphicsDevice};

    // Logging sub-module (macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger, set_logger, reset_logger};
    }

    // Backend abstraction sub-module
    pub mod device {
        pub use crate::device::*;
    }

    // Buffer set sub-module
    pub mod target {
        pub use crate::target::*;
    }

    // Lights and accumulation sub-module
    pub mod lighting {
        pub use crate::lighting::*;
    }

    // Frame protocol sub-module
    pub mod pipeline {
        pub use crate::pipeline::*;
    }
}

// Re-export math library at crate root
pub use glam;
