pub const A_COORDINATES: &str = "a_coordinates";
pub const A_UV: &str = "a_uv";
pub const VERTEX_SHADER_SOURCE: &str = "
	precision highp float;

	attribute vec2 a_coordinates;
	attribute vec2 a_uv;
	varying vec2 v_uv;

	void main() {
	    gl_Position = vec4(a_coordinates, 0.0, 1.0);
	    v_uv = a_uv;
	}
";

pub const U_INJECT_RADIUS: &str = "u_inject_radius";
pub const U_DIFFUSE_RATE: &str = "u_diffuse_rate";
pub const U_TIME_STEP: &str = "u_time_step";
pub const U_DOWN_MULT: &str = "u_down_mult";
pub const U_UP_MULT: &str = "u_up_mult";
pub const U_RESOLUTION: &str = "u_resolution";
pub const U_SMOKE_SOURCE: &str = "u_smoke_source";
pub const U_TEXTURE: &str = "u_texture";
pub const SMOKE_SHADER_SOURCE: &str = "
	precision highp float;
	precision highp sampler2D;

	uniform float u_inject_radius;
	uniform float u_diffuse_rate;
	uniform float u_time_step;
	uniform float u_down_mult;
	uniform float u_up_mult;
	uniform vec2 u_resolution;
	uniform vec3 u_smoke_source;
	uniform sampler2D u_texture;

	void main() {
	    vec2 frag_coord = gl_FragCoord.xy;
	    vec2 pixel = frag_coord / u_resolution;
	    vec4 color = texture2D(u_texture, pixel);

	    float dist = distance(u_smoke_source.xy, frag_coord);
	    color.r += u_smoke_source.z * max(u_inject_radius - dist, 0.0);

	    float x_pixel = 1.0 / u_resolution.x;
	    float y_pixel = 1.0 / u_resolution.y;
	    float right = texture2D(u_texture, vec2(pixel.x + x_pixel, pixel.y)).r;
	    float left = texture2D(u_texture, vec2(pixel.x - x_pixel, pixel.y)).r;
	    float up = texture2D(u_texture, vec2(pixel.x, pixel.y + y_pixel)).r;
	    float down = texture2D(u_texture, vec2(pixel.x, pixel.y - y_pixel)).r;

	    if (pixel.y <= y_pixel) {
	        down = 0.0;
	    }

	    float factor = u_diffuse_rate * u_time_step
	        * (left + right + down * u_down_mult + up - u_up_mult * color.r);
	    color.r += factor;

	    gl_FragColor = color;
	}
";

pub const U_DENSITY: &str = "u_density";
pub const U_FLIP_X: &str = "u_flip_x";
pub const DISPLAY_SHADER_SOURCE: &str = "
	precision highp float;
	precision highp sampler2D;

	varying vec2 v_uv;

	uniform float u_density;
	uniform float u_flip_x;
	uniform sampler2D u_texture;

	void main() {
	    vec2 uv = vec2(mix(v_uv.x, 1.0 - v_uv.x, u_flip_x), v_uv.y);
	    vec4 color = texture2D(u_texture, uv);
	    vec3 rgb = mix(color.rgb, vec3(color.r), u_density);
	    gl_FragColor = vec4(clamp(rgb, 0.0, 1.0), 1.0);
	}
";

pub const COPY_SHADER_SOURCE: &str = "
	precision highp float;
	precision highp sampler2D;

	varying vec2 v_uv;

	uniform sampler2D u_texture;

	void main() {
	    gl_FragColor = texture2D(u_texture, v_uv);
	}
";
